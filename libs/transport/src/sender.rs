use std::io;
use std::net::Shutdown;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use telelink_api::{seeded_rng, Clock, LinkError, Record, Stage, DEFAULT_PORT};

// ═══════════════════════════════════════════════════════════════
//  Config
// ═══════════════════════════════════════════════════════════════

/// Итоговая конфигурация отправителя. Собирается один раз при старте.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    /// Длина `data` в символах.
    pub size: usize,
    /// Сколько байт ответа читать (и выбрасывать).
    pub rsize: usize,
    pub pause: Duration,
    /// `None` — до прерывания.
    pub count: Option<u64>,
    /// Limit for connect and for the response read. `None` leaves it to the OS.
    pub timeout: Option<Duration>,
    pub seed: u64,
    pub quiet: bool,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            size: 32,
            rsize: 1024,
            pause: Duration::from_secs(1),
            count: None,
            timeout: None,
            seed: 0,
            quiet: false,
        }
    }
}

impl SenderConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        crate::check_range("size", self.size, 0)?;
        crate::check_range("rsize", self.rsize, 0)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Outcomes
// ═══════════════════════════════════════════════════════════════

/// Record was written and the response drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub response_len: usize,
}

/// Result of one cycle. Transport failures end up in `Skipped`, never as `Err`.
#[derive(Debug)]
pub enum CycleReport {
    Sent { record: Record, response_len: usize },
    Skipped { record: Record, error: LinkError },
}

impl CycleReport {
    pub fn is_sent(&self) -> bool {
        matches!(self, CycleReport::Sent { .. })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SendStats {
    pub cycles: u64,
    pub sent: u64,
    pub skipped: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Sender
// ═══════════════════════════════════════════════════════════════

pub struct Sender {
    config: SenderConfig,
    rng: StdRng,
    clock: Clock,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Self {
        let rng = seeded_rng(config.seed);
        Self { config, rng, clock: Clock::new() }
    }

    pub fn next_record(&mut self) -> Record {
        Record::generate(&mut self.rng, &mut self.clock, self.config.size)
    }

    /// One connection: connect, write the record, drain up to `rsize` bytes
    /// of response, shut down both directions.
    pub async fn send_once(&self, record: &Record) -> Result<Delivered, LinkError> {
        let payload = record.encode()?;
        self.send_payload(&payload).await
    }

    async fn send_payload(&self, payload: &[u8]) -> Result<Delivered, LinkError> {
        let mut stream = self.connect().await?;

        stream
            .write_all(payload)
            .await
            .map_err(|e| LinkError::transport(Stage::Write, e))?;

        let response_len = self.drain_response(&mut stream).await?;

        let stream = stream
            .into_std()
            .map_err(|e| LinkError::transport(Stage::Shutdown, e))?;
        match stream.shutdown(Shutdown::Both) {
            // peer already closed its side
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
            Err(e) => return Err(LinkError::transport(Stage::Shutdown, e)),
            Ok(()) => {}
        }

        Ok(Delivered { response_len })
    }

    async fn connect(&self) -> Result<TcpStream, LinkError> {
        let addr = self.config.addr();
        let attempt = TcpStream::connect(addr.as_str());
        let result = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or_else(|_| Err(timed_out("connect"))),
            None => attempt.await,
        };
        result.map_err(|e| LinkError::transport(Stage::Connect, e))
    }

    async fn drain_response(&self, stream: &mut TcpStream) -> Result<usize, LinkError> {
        let mut buf = vec![0u8; self.config.rsize];
        let read = stream.read(&mut buf);
        let result = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .unwrap_or_else(|_| Err(timed_out("response read"))),
            None => read.await,
        };
        result.map_err(|e| LinkError::transport(Stage::Read, e))
    }

    /// Generate a record and try to deliver it. Never fails: a transport
    /// error only marks the cycle as skipped.
    pub async fn cycle(&mut self) -> CycleReport {
        let record = self.next_record();
        let addr = self.config.addr();

        let payload = match record.encode() {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(error = %error, "cannot encode record");
                return CycleReport::Skipped { record, error };
            }
        };
        if !self.config.quiet {
            println!("SND: {addr}  {}", String::from_utf8_lossy(&payload));
        }

        match self.send_payload(&payload).await {
            Ok(Delivered { response_len }) => {
                tracing::debug!(addr = %addr, response_len, "record sent");
                CycleReport::Sent { record, response_len }
            }
            Err(error) => {
                tracing::debug!(addr = %addr, error = %error, "cycle skipped");
                CycleReport::Skipped { record, error }
            }
        }
    }

    /// Основной цикл: cycle → pause → cycle ... до отмены или `count` циклов.
    pub async fn run(&mut self, token: &CancellationToken) -> SendStats {
        let mut stats = SendStats::default();
        tracing::info!(addr = %self.config.addr(), size = self.config.size, "sending records");

        loop {
            let report = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                report = self.cycle() => report,
            };

            stats.cycles += 1;
            if report.is_sent() {
                stats.sent += 1;
            } else {
                stats.skipped += 1;
            }

            if self.config.count.is_some_and(|n| stats.cycles >= n) {
                break;
            }
            if !crate::pause(token, self.config.pause).await {
                break;
            }
        }

        tracing::info!(cycles = stats.cycles, sent = stats.sent, skipped = stats.skipped, "done");
        stats
    }
}

fn timed_out(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{what} timed out"))
}
