use std::time::Duration;

use clap::{ArgAction, Args};
use serde::Deserialize;

use telelink_transport::SenderConfig;

use super::error::SendError;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub size: Option<usize>,
    pub rsize: Option<usize>,
    pub time: Option<f64>,
    pub count: Option<u64>,
    pub timeout: Option<f64>,
    pub seed: Option<u64>,
    pub quiet: Option<bool>,
}

pub fn load_config(path: &str) -> Result<Config, SendError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SendError::Config { context: "read", detail: format!("'{path}': {e}") })?;
    toml::from_str(&content)
        .map_err(|e| SendError::Config { context: "parse", detail: format!("'{path}': {e}") })
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct SendArgs {
    /// Путь к config.toml (значения из CLI важнее)
    #[arg(long, env = "TELELINK_SEND_CONFIG")]
    pub config: Option<String>,

    /// Хост получателя. По умолчанию 127.0.0.1
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Порт получателя. По умолчанию 8500
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Длина поля data в символах. По умолчанию 32
    #[arg(short, long, value_name = "SIZE")]
    pub size: Option<usize>,

    /// Сколько байт ответа читать. По умолчанию 1024
    #[arg(short, long, value_name = "SIZE")]
    pub rsize: Option<usize>,

    /// Пауза между отправками, секунды. По умолчанию 1
    #[arg(short, long, value_name = "SECONDS")]
    pub time: Option<f64>,

    /// Остановиться после N циклов (0 = бесконечно)
    #[arg(short, long, value_name = "N")]
    pub count: Option<u64>,

    /// Таймаут connect и чтения ответа, секунды. Без него — таймаут ОС
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Seed для генератора data (0 = случайный)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Не печатать отправляемые записи
    #[arg(short, long)]
    pub quiet: bool,

    /// Подробнее логировать (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

// ═══════════════════════════════════════════════════════════════
//  Effective config
// ═══════════════════════════════════════════════════════════════

/// Итоговая конфигурация: defaults < config.toml < env/CLI
pub fn effective(args: &SendArgs) -> Result<SenderConfig, SendError> {
    let cfg = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let defaults = SenderConfig::default();

    let pause = match args.time.or(cfg.time) {
        Some(secs) => seconds("time", secs)?,
        None => defaults.pause,
    };
    let timeout = args
        .timeout
        .or(cfg.timeout)
        .map(|secs| seconds("timeout", secs))
        .transpose()?;

    let config = SenderConfig {
        host: args.host.clone().or(cfg.host).unwrap_or(defaults.host),
        port: args.port.or(cfg.port).unwrap_or(defaults.port),
        size: args.size.or(cfg.size).unwrap_or(defaults.size),
        rsize: args.rsize.or(cfg.rsize).unwrap_or(defaults.rsize),
        pause,
        count: args.count.or(cfg.count).filter(|&n| n > 0),
        timeout,
        seed: args.seed.or(cfg.seed).unwrap_or(defaults.seed),
        quiet: args.quiet || cfg.quiet.unwrap_or(false),
    };
    config.validate()?;
    Ok(config)
}

fn seconds(name: &'static str, secs: f64) -> Result<Duration, SendError> {
    Duration::try_from_secs_f64(secs).map_err(|e| SendError::Config {
        context: name,
        detail: format!("{secs}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use telelink_api::LinkError;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SendArgs,
    }

    fn parse(argv: &[&str]) -> SendArgs {
        let mut full = vec!["telelink-send"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn defaults_without_flags() {
        let cfg = effective(&parse(&[])).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8500);
        assert_eq!(cfg.size, 32);
        assert_eq!(cfg.rsize, 1024);
        assert_eq!(cfg.pause, Duration::from_secs(1));
        assert_eq!(cfg.count, None);
        assert_eq!(cfg.timeout, None);
        assert!(!cfg.quiet);
    }

    #[test]
    fn short_flags() {
        let args = parse(&["-H", "recv_host", "-p", "8601", "-s", "4096", "-r", "16", "-t", "2", "-q", "-vv"]);
        assert_eq!(args.verbose, 2);
        let cfg = effective(&args).unwrap();
        assert_eq!(cfg.host, "recv_host");
        assert_eq!(cfg.port, 8601);
        assert_eq!(cfg.size, 4096);
        assert_eq!(cfg.rsize, 16);
        assert_eq!(cfg.pause, Duration::from_secs(2));
        assert!(cfg.quiet);
    }

    #[test]
    fn zero_count_means_forever() {
        assert_eq!(effective(&parse(&["-c", "0"])).unwrap().count, None);
        assert_eq!(effective(&parse(&["-c", "3"])).unwrap().count, Some(3));
    }

    #[test]
    fn negative_pause_is_rejected() {
        let err = effective(&parse(&["--time=-1"])).unwrap_err();
        assert!(err.to_string().starts_with("config (time)"), "{err}");
    }

    #[test]
    fn huge_sizes_are_rejected() {
        let err = effective(&parse(&["-s", "18446744073709551615"])).unwrap_err();
        assert!(matches!(err, SendError::Link(LinkError::Config(_))), "{err}");
        assert!(err.to_string().contains("size"), "{err}");

        let err = effective(&parse(&["-r", "18446744073709551615"])).unwrap_err();
        assert!(err.to_string().contains("rsize"), "{err}");

        let limit = telelink_transport::MAX_BUFFER.to_string();
        assert_eq!(effective(&parse(&["-s", &limit, "-r", &limit])).unwrap().size, telelink_transport::MAX_BUFFER);
    }

    #[test]
    fn cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"10.0.0.2\"\nport = 9000\nsize = 8\ntime = 0.5\ntimeout = 3").unwrap();
        let path = file.path().to_str().unwrap();

        let cfg = effective(&parse(&["--config", path, "-p", "9100"])).unwrap();
        assert_eq!(cfg.host, "10.0.0.2");
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.size, 8);
        assert_eq!(cfg.pause, Duration::from_millis(500));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn unknown_key_in_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backlog = 5").unwrap();
        let path = file.path().to_str().unwrap();

        let err = effective(&parse(&["--config", path])).unwrap_err();
        assert!(err.to_string().starts_with("config (parse)"), "{err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = effective(&parse(&["--config", "/nonexistent/telelink.toml"])).unwrap_err();
        assert!(err.to_string().starts_with("config (read)"), "{err}");
    }
}
