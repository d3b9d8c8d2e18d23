pub mod command;
pub mod parse;

use crate::{
    config::Config,
    disk::{init::perform_disk_initialization, FileDisk, JbodArray, SignatureTable},
    shell::{
        command::{execute_command, Command},
        parse::parse_command,
    },
    storage::{DriverError, StorageDriver},
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::{error::Error, io::stdout, path::PathBuf, sync::mpsc, thread};

/// Shell 操作的驱动：镜像文件上的 JBOD 阵列
pub type ArrayDriver = StorageDriver<JbodArray<FileDisk>>;

/// 后台初始化线程发给 shell 的启动进度
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Result<ArrayDriver, Box<dyn Error + Send>>),
}

pub fn start_shell(config: Config) {
    let Some(mut driver) = boot(&config) else {
        return;
    };

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mdadm_history");

    let mut line_editor = match FileBackedHistory::with_file(100, history_path) {
        Ok(history) => Reedline::create().with_history(Box::new(history)),
        Err(e) => {
            println!("{} {}", "⚠️  History disabled:".yellow(), e);
            Reedline::create()
        }
    };

    // 命令补全
    let commands: Vec<String> = vec![
        "help", "mount", "unmount", "grant", "revoke", "status", "read", "write", "fill", "sign",
        "cache", "create", "resize", "destroy", "stats", "format", "exit",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let completer = reedline::DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let state = match (driver.is_mounted(), driver.has_write_permission()) {
            (false, _) => "unmounted".red(),
            (true, false) => "ro".yellow(),
            (true, true) => "rw".green(),
        };
        let full_prompt = format!(
            "{}:[{}]",
            format!("{}@{}", username, hostname).green(),
            state
        );

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(full_prompt),
            DefaultPromptSegment::Basic("mdadm".bright_blue().bold().to_string()),
        );
        let input = line_editor.read_line(&prompt);

        match input {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Ok(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut driver) {
                            report_error(e.as_ref());
                        }
                        if matches!(cmd, Command::Exit) {
                            break;
                        }
                    }
                    Err(msg) => println!(
                        "{} {}",
                        "⚠️ ".yellow(),
                        format!("{}. Type 'help' for command list.", msg).yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting mdadm...".yellow());
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    shutdown(&config, &mut driver);
    println!("{}", "GoodBye!".bright_yellow());
}

/// 驱动错误附带传统返回码
fn report_error(e: &(dyn Error + 'static)) {
    match e.downcast_ref::<DriverError>() {
        Some(driver_err) => println!(
            "{} {} {}",
            "❌ Error:".red().bold(),
            e,
            error_detail(driver_err).bright_black()
        ),
        None => println!("{} {}", "❌ Error:".red().bold(), e),
    }
}

/// 设备中途失败时，只有前 `transferred` 字节确定已完成
fn error_detail(e: &DriverError) -> String {
    if matches!(e, DriverError::Device { .. }) {
        format!("(rc {}, {} bytes transferred)", e.code(), e.transferred())
    } else {
        format!("(rc {})", e.code())
    }
}

/// 后台初始化磁盘，前台画进度条
fn boot(config: &Config) -> Option<ArrayDriver> {
    let mut stdout = stdout();
    let _ = execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0));
    println!("{}", "[mdadm Booting...]".bright_yellow().bold());

    let (tx, rx) = mpsc::channel();
    let worker_config = config.clone();
    let worker = thread::spawn(move || perform_disk_initialization(worker_config, tx));

    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut result = None;
    for progress in rx {
        match progress {
            BootProgress::Step(msg) => pb.set_message(msg),
            BootProgress::Progress(p) => pb.set_position(p),
            BootProgress::Finished(r) => {
                result = Some(r);
                break;
            }
        }
    }
    let _ = worker.join();

    match result {
        Some(Ok(driver)) => {
            pb.finish_with_message("✅ Ready!");
            let _ = execute!(
                stdout,
                SetForegroundColor(Color::Cyan),
                Print(format!(
                    "Welcome to mdadm v{} ({})\n",
                    env!("CARGO_PKG_VERSION"),
                    config.disk_path.display()
                )),
                ResetColor
            );
            Some(driver)
        }
        Some(Err(e)) => {
            pb.abandon_with_message("❌ Boot failed");
            println!("{} {}", "❌ Error:".red().bold(), e);
            None
        }
        None => {
            pb.abandon_with_message("❌ Boot failed");
            println!(
                "{}",
                "❌ Error: disk initialization stopped unexpectedly".red()
            );
            None
        }
    }
}

/// 退出前保存签名表，启用缓存时打印命中率
fn shutdown(config: &Config, driver: &mut ArrayDriver) {
    if driver.is_mounted() {
        if let Err(e) = driver.unmount() {
            println!("{} {}", "⚠️  Unmount failed:".yellow(), e);
        }
    }

    let signatures = driver.device().signatures();
    if !signatures.is_empty() {
        let path = SignatureTable::sidecar_path(&config.disk_path);
        if let Err(e) = signatures.save(&path) {
            println!("{} {}", "⚠️  Could not save signatures:".yellow(), e);
        }
    }

    if driver.cache().is_enabled() {
        driver.cache().print_hit_rate();
    }
}
