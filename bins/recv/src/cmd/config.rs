use std::time::Duration;

use clap::{ArgAction, Args};
use serde::Deserialize;

use telelink_transport::ReceiverConfig;

use super::error::RecvError;

// ---- TOML Config ----

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub backlog: Option<u32>,
    pub size: Option<usize>,
    pub time: Option<f64>,
    pub count: Option<u64>,
    pub quiet: Option<bool>,
    pub keep_going: Option<bool>,
}

pub fn load_config(path: &str) -> Result<Config, RecvError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RecvError::Config { context: "read", detail: format!("'{path}': {e}") })?;
    toml::from_str(&content)
        .map_err(|e| RecvError::Config { context: "parse", detail: format!("'{path}': {e}") })
}

// ---- CLI ----

#[derive(Args, Clone, Debug)]
pub struct RecvArgs {
    /// Путь к config.toml (значения из CLI важнее)
    #[arg(long, env = "TELELINK_RECV_CONFIG")]
    pub config: Option<String>,

    /// Глубина очереди listen(). По умолчанию 5
    #[arg(short, long, value_name = "NUMBER")]
    pub backlog: Option<u32>,

    /// Адрес для bind. По умолчанию 0.0.0.0
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Порт. По умолчанию 8500
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Размер буфера приёма, байт. По умолчанию 1024
    #[arg(short, long, value_name = "SIZE")]
    pub size: Option<usize>,

    /// Пауза между приёмами, секунды. По умолчанию 0.2
    #[arg(short, long, value_name = "SECONDS")]
    pub time: Option<f64>,

    /// Остановиться после N соединений (0 = бесконечно)
    #[arg(short, long, value_name = "N")]
    pub count: Option<u64>,

    /// Пропускать битые записи вместо завершения
    #[arg(short, long)]
    pub keep_going: bool,

    /// Не печатать принятые записи
    #[arg(short, long)]
    pub quiet: bool,

    /// Подробнее логировать (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Итоговая конфигурация: defaults < config.toml < env/CLI
pub fn effective(args: &RecvArgs) -> Result<ReceiverConfig, RecvError> {
    let cfg = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let defaults = ReceiverConfig::default();

    let pause = match args.time.or(cfg.time) {
        Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| RecvError::Config {
            context: "time",
            detail: format!("{secs}: {e}"),
        })?,
        None => defaults.pause,
    };

    let config = ReceiverConfig {
        host: args.host.clone().or(cfg.host).unwrap_or(defaults.host),
        port: args.port.or(cfg.port).unwrap_or(defaults.port),
        backlog: args.backlog.or(cfg.backlog).unwrap_or(defaults.backlog),
        size: args.size.or(cfg.size).unwrap_or(defaults.size),
        pause,
        count: args.count.or(cfg.count).filter(|&n| n > 0),
        quiet: args.quiet || cfg.quiet.unwrap_or(false),
        keep_going: args.keep_going || cfg.keep_going.unwrap_or(false),
    };
    config.validate()?;
    Ok(config)
}
