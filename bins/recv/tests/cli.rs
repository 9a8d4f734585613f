use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn connect_retry(port: u16) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)) {
            return stream;
        }
        sleep(Duration::from_millis(50));
    }
    panic!("receiver never started listening on {port}");
}

#[test]
fn test_prints_received_record() {
    let port = free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_telelink-recv"))
        .args(["-H", "127.0.0.1", "-p", &port.to_string(), "-c", "1"])
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stream = connect_retry(port);
    stream
        .write_all(br#"{"data": "k3x9q", "time": "2026-10-19 10:00:00.123456"}"#)
        .unwrap();

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("RCV: 127.0.0.1:"), "{stdout}");
    assert!(stdout.trim_end().ends_with("  2026-10-19 10:00:00.123456  k3x9q"), "{stdout}");
}

#[test]
fn test_garbage_ends_receiver_with_error() {
    let port = free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_telelink-recv"))
        .args(["-H", "127.0.0.1", "-p", &port.to_string(), "-q"])
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stream = connect_retry(port);
    stream.write_all(b"hello").unwrap();

    let out = child.wait_with_output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error: record decode"), "{stderr}");
}

#[test]
fn test_busy_port_is_fatal() {
    let busy = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = busy.local_addr().unwrap().port();

    let out = Command::new(env!("CARGO_BIN_EXE_telelink-recv"))
        .args(["-H", "127.0.0.1", "-p", &port.to_string()])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error: bind 127.0.0.1:"));
}

#[test]
fn test_zero_buffer_is_rejected() {
    let out = Command::new(env!("CARGO_BIN_EXE_telelink-recv"))
        .args(["-H", "127.0.0.1", "-p", &free_port().to_string(), "-s", "0"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Error: config: size"), "{stderr}");
}

#[cfg(unix)]
#[test]
fn test_sigint_prints_blank_line_and_exits_zero() {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let port = free_port();
    let mut child = Command::new(env!("CARGO_BIN_EXE_telelink-recv"))
        .args(["-H", "127.0.0.1", "-p", &port.to_string(), "-t", "60"])
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let mut stream = connect_retry(port);
    stream
        .write_all(br#"{"data": "ab12", "time": "2026-10-19 10:00:00.000001"}"#)
        .unwrap();
    drop(stream);

    let mut first = String::new();
    stdout.read_line(&mut first).unwrap();
    assert!(first.starts_with("RCV: 127.0.0.1:"), "{first}");

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();
    let status = child.wait().unwrap();
    assert!(status.success(), "{status}");

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "\n");
}
