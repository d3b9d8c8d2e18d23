use crate::{
    shell::command::{CacheCommand, Command},
    utils::parse_number,
};

pub fn parse_command(input: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = input.split_ascii_whitespace().collect();
    let Some((&cmd, args)) = tokens.split_first() else {
        return Err("empty command".to_string());
    };

    match cmd {
        "help" => Ok(Command::Help),
        "mount" => Ok(Command::Mount),
        "unmount" => Ok(Command::Unmount),
        "grant" => Ok(Command::Grant),
        "revoke" => Ok(Command::Revoke),
        "status" => Ok(Command::Status),
        "read" => match args {
            [addr, len] => Ok(Command::Read {
                addr: number(addr)?,
                len: number(len)?,
            }),
            _ => Err("usage: read <addr> <len>".to_string()),
        },
        "write" => match args {
            [addr, _, ..] => Ok(Command::Write {
                addr: number(addr)?,
                data: args[1..].join(" ").into_bytes(),
            }),
            _ => Err("usage: write <addr> <text>".to_string()),
        },
        "fill" => match args {
            [addr, len, byte] => Ok(Command::Fill {
                addr: number(addr)?,
                len: number(len)?,
                byte: number(byte)?,
            }),
            _ => Err("usage: fill <addr> <len> <byte>".to_string()),
        },
        "sign" => match args {
            [disk, block] => Ok(Command::Sign {
                disk: number(disk)?,
                block: number(block)?,
            }),
            _ => Err("usage: sign <disk> <block>".to_string()),
        },
        "cache" => match args {
            ["create", n] => Ok(Command::Cache(CacheCommand::Create(number(n)?))),
            ["resize", n] => Ok(Command::Cache(CacheCommand::Resize(number(n)?))),
            ["destroy"] => Ok(Command::Cache(CacheCommand::Destroy)),
            ["stats"] => Ok(Command::Cache(CacheCommand::Stats)),
            _ => Err("usage: cache create <n> | resize <n> | destroy | stats".to_string()),
        },
        "format" => Ok(Command::Format),
        "exit" | "quit" => Ok(Command::Exit),
        other => Err(format!("unknown command '{}'", other)),
    }
}

/// 解析数字并收窄到目标类型
fn number<T: TryFrom<u64>>(s: &str) -> Result<T, String> {
    let value = parse_number(s)?;
    T::try_from(value).map_err(|_| format!("'{}' is out of range", s))
}
