use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpSocket};
use tokio_util::sync::CancellationToken;

use telelink_api::{LinkError, Record, DEFAULT_PORT};

/// Итоговая конфигурация получателя.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub host: String,
    pub port: u16,
    /// Глубина очереди listen().
    pub backlog: u32,
    /// Размер буфера приёма: больше за одно соединение не читается.
    pub size: usize,
    pub pause: Duration,
    pub count: Option<u64>,
    pub quiet: bool,
    /// Log undecodable records and keep accepting instead of failing.
    pub keep_going: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            backlog: 5,
            size: 1024,
            pause: Duration::from_millis(200),
            count: None,
            quiet: false,
            keep_going: false,
        }
    }
}

impl ReceiverConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Пустой буфер не может вместить ни одной записи, поэтому `size >= 1`.
    pub fn validate(&self) -> Result<(), LinkError> {
        crate::check_range("size", self.size, 1)
    }
}

/// One record taken off one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub peer: SocketAddr,
    pub record: Record,
}

pub struct Receiver {
    config: ReceiverConfig,
    listener: TcpListener,
}

impl Receiver {
    /// Validate the config, bind with SO_REUSEADDR and start listening.
    /// Any failure here is fatal.
    pub async fn bind(config: ReceiverConfig) -> Result<Self, LinkError> {
        config.validate()?;
        let addr = config.addr();
        let bind_err = |source: std::io::Error| LinkError::Bind { addr: addr.clone(), source };

        let sock_addr = tokio::net::lookup_host(addr.as_str())
            .await
            .map_err(bind_err)?
            .next()
            .ok_or_else(|| {
                bind_err(std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no address"))
            })?;

        let socket = if sock_addr.is_ipv4() { TcpSocket::new_v4() } else { TcpSocket::new_v6() }
            .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(sock_addr).map_err(bind_err)?;
        let listener = socket.listen(config.backlog).map_err(bind_err)?;

        tracing::info!(addr = %sock_addr, backlog = config.backlog, "listening");
        Ok(Self { config, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LinkError> {
        self.listener.local_addr().map_err(LinkError::Accept)
    }

    /// Accept one connection, read at most `size` bytes with a single read,
    /// decode them and close the connection.
    pub async fn accept_one(&self) -> Result<Delivery, LinkError> {
        let (mut stream, peer) = self.listener.accept().await.map_err(LinkError::Accept)?;
        tracing::debug!(peer = %peer, "connection accepted");

        let mut buf = vec![0u8; self.config.size];
        let n = stream.read(&mut buf).await.map_err(LinkError::Read)?;
        drop(stream);

        match Record::decode_within(&buf[..n], self.config.size) {
            Ok(record) => Ok(Delivery { peer, record }),
            Err(e) => {
                tracing::debug!(peer = %peer, bytes = n, error = %e, "undecodable record");
                Err(e)
            }
        }
    }

    /// Основной цикл приёма. Возвращает число принятых записей.
    ///
    /// Stops on cancellation, after `count` connections, or on the first
    /// error unless `keep_going` allows skipping it.
    pub async fn run(&self, token: &CancellationToken) -> Result<u64, LinkError> {
        let mut cycles = 0u64;
        let mut received = 0u64;

        loop {
            let delivery = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                delivery = self.accept_one() => delivery,
            };
            cycles += 1;

            match delivery {
                Ok(Delivery { peer, record }) => {
                    received += 1;
                    if !self.config.quiet {
                        println!("RCV: {peer}  {}  {}", record.time, record.data);
                    }
                }
                Err(e) if self.config.keep_going && e.is_per_connection() => {
                    tracing::warn!(error = %e, kind = %e.kind(), "record dropped");
                }
                Err(e) => return Err(e),
            }

            if self.config.count.is_some_and(|n| cycles >= n) {
                break;
            }
            if !crate::pause(token, self.config.pause).await {
                break;
            }
        }

        tracing::info!(cycles, received, "done");
        Ok(received)
    }
}
