use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;

use crate::{
    disk::{JbodCommand, JBOD_TOTAL_SIZE},
    shell::ArrayDriver,
    storage::MAX_IO_SIZE,
    utils::hexdump,
};

#[derive(Debug, PartialEq, Eq)]
pub enum CacheCommand {
    Create(usize),
    Resize(usize),
    Destroy,
    Stats,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Mount,
    Unmount,
    Grant,
    Revoke,
    Status,
    Read { addr: u32, len: u32 },
    Write { addr: u32, data: Vec<u8> },
    Fill { addr: u32, len: u32, byte: u8 },
    Sign { disk: u8, block: u8 },
    Cache(CacheCommand),
    Format,
    Exit,
}

pub fn execute_command(cmd: &Command, driver: &mut ArrayDriver) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Mount => {
            driver.mount()?;
            println!("{}", "✅ Array mounted".green());
        }
        Command::Unmount => {
            driver.unmount()?;
            println!("{}", "📤 Array unmounted".yellow());
        }
        Command::Grant => {
            driver.grant_write_permission();
            println!("{}", "🔓 Write permission granted".green());
        }
        Command::Revoke => {
            driver.revoke_write_permission();
            println!("{}", "🔒 Write permission revoked".yellow());
        }
        Command::Status => print_status(driver),
        Command::Read { addr, len } => {
            // 超长请求交给驱动拒绝，这里不按请求长度分配
            let mut buf = vec![0u8; (*len).min(MAX_IO_SIZE) as usize];
            let n = driver.read(*addr, *len, Some(&mut buf[..]))?;
            println!(
                "📖 Read {} bytes at {}",
                n.to_string().cyan(),
                format!("{:#x}", addr).cyan()
            );
            for line in hexdump(*addr, &buf) {
                println!("{}", line.bright_black());
            }
        }
        Command::Write { addr, data } => {
            let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
            let n = driver.write(*addr, len, Some(&data[..]))?;
            println!(
                "✏️  Wrote {} bytes at {}",
                n.to_string().green(),
                format!("{:#x}", addr).cyan()
            );
        }
        Command::Fill { addr, len, byte } => {
            let data = vec![*byte; (*len).min(MAX_IO_SIZE) as usize];
            let n = driver.write(*addr, *len, Some(&data[..]))?;
            println!(
                "✏️  Filled {} bytes at {} with {}",
                n.to_string().green(),
                format!("{:#x}", addr).cyan(),
                format!("{:#04x}", byte).cyan()
            );
        }
        Command::Sign { disk, block } => {
            driver.sign_block(*disk, *block)?;
            let digest = driver
                .device()
                .signature(*disk, *block)
                .map(|sig| sig.iter().map(|b| format!("{:02x}", b)).collect::<String>())
                .unwrap_or_default();
            println!(
                "🔏 Signed disk {} block {}: {}",
                disk,
                block,
                digest.bright_magenta()
            );
        }
        Command::Cache(cache_cmd) => execute_cache_command(cache_cmd, driver)?,
        Command::Format => format_array(driver)?,
        Command::Exit => println!("{}", "👋 Exiting mdadm shell...".yellow().bold()),
    }

    Ok(())
}

fn execute_cache_command(
    cmd: &CacheCommand,
    driver: &mut ArrayDriver,
) -> Result<(), Box<dyn Error>> {
    let cache = driver.cache_mut();
    match cmd {
        CacheCommand::Create(n) => {
            cache.create(*n)?;
            println!("🗃️  Cache created with {} entries", n.to_string().green());
        }
        CacheCommand::Resize(n) => {
            cache.resize(*n)?;
            println!("🗃️  Cache resized to {} entries", n.to_string().green());
        }
        CacheCommand::Destroy => {
            cache.destroy()?;
            println!("{}", "🗑️ Cache destroyed".red());
        }
        CacheCommand::Stats => {
            let stats = cache.stats();
            println!(
                "{}\n{}: {}/{} ({})\n{}: {}\n{}: {}",
                "📊 Cache".bright_yellow().bold(),
                "Entries".blue(),
                cache.len(),
                cache.capacity(),
                cache.policy(),
                "Clock".blue(),
                cache.clock(),
                "Hits".blue(),
                stats
            );
            if cache.is_empty() {
                println!("{}", "No blocks cached yet".bright_black());
            }
        }
    }
    Ok(())
}

/// 以最大传输长度把整个阵列清零
fn format_array(driver: &mut ArrayDriver) -> Result<(), Box<dyn Error>> {
    let confirmed = Confirm::new()
        .with_prompt("Zero every block of the array?")
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", "Format cancelled".bright_black());
        return Ok(());
    }

    println!("💾 Formatting array...");
    let zeros = vec![0u8; MAX_IO_SIZE as usize];
    let total = JBOD_TOTAL_SIZE as u64;
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.green/black}] {bytes}/{total_bytes} {msg}")?
            .progress_chars("#>-"),
    );
    for addr in (0..total).step_by(MAX_IO_SIZE as usize) {
        if let Err(e) = driver.write(addr as u32, MAX_IO_SIZE, Some(&zeros[..])) {
            pb.abandon_with_message("❌ Format aborted");
            return Err(Box::new(e));
        }
        pb.set_position(addr + MAX_IO_SIZE as u64);
    }
    pb.finish_with_message("✅ Array formatted");
    Ok(())
}

fn print_status(driver: &ArrayDriver) {
    let yes_no = |b: bool| if b { "yes".green() } else { "no".red() };
    let cache = driver.cache();
    let jbod = driver.device();

    println!("{}", "📊 Array Status".bright_yellow().bold());
    println!("{}: {}", "Mounted".blue(), yes_no(driver.is_mounted()));
    println!(
        "{}: {}",
        "Writable".blue(),
        yes_no(driver.has_write_permission())
    );
    if cache.is_enabled() {
        println!(
            "{}: {}/{} entries ({})",
            "Cache".blue(),
            cache.len(),
            cache.capacity(),
            cache.policy()
        );
    } else {
        println!("{}: {}", "Cache".blue(), "disabled".bright_black());
    }
    println!("{}: {}", "Signed blocks".blue(), jbod.signatures().len());
    println!(
        "{}: seek {}/{}, read {}, write {}",
        "Device ops".blue(),
        jbod.count(JbodCommand::SeekToDisk),
        jbod.count(JbodCommand::SeekToBlock),
        jbod.count(JbodCommand::ReadBlock),
        jbod.count(JbodCommand::WriteBlock)
    );
}

fn print_help() {
    println!("{}", "📘 mdadm Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  mount                      Mount the disk array
  unmount                    Unmount the disk array
  grant                      Grant write permission
  revoke                     Revoke write permission
  status                     Show array, cache and device state
  read <addr> <len>          Hex dump <len> bytes (max 1024) at linear <addr>
  write <addr> <text>        Write text at linear <addr>
  fill <addr> <len> <byte>   Fill <len> bytes at <addr> with <byte>
  sign <disk> <block>        Sign a block and print its digest
  cache create <n>           Enable the block cache with <n> entries (2..4096)
  cache resize <n>           Resize the block cache
  cache destroy              Disable the block cache
  cache stats                Show cache occupancy and hit rate
  format                     Zero the whole array
  help                       Show this help message
  exit                       Quit the shell

  Numbers may be decimal or 0x-prefixed hex.
"
        .bright_black()
    );
}
