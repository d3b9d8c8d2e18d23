//! 全局日志：按级别着色，输出到标准错误

use chrono::Local;
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}][{:>5}][{}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        eprintln!("{}", paint(record.level(), line));
    }

    fn flush(&self) {}
}

fn paint(level: Level, line: String) -> ColoredString {
    match level {
        Level::Error => line.red(),
        Level::Warn => line.bright_yellow(),
        Level::Info => line.blue(),
        Level::Debug => line.green(),
        Level::Trace => line.bright_black(),
    }
}

static LOGGER: SimpleLogger = SimpleLogger;

/// 安装日志器；重复调用时保留第一次的设置
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
