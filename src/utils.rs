/// 解析十进制或 `0x` 开头的十六进制数
pub fn parse_number(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|_| format!("'{}' is not a valid number", s))
}

/// 16 字节一行的十六进制转储，行首为线性地址
pub fn hexdump(start: u32, bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, row)| {
            let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
            let ascii: String = row
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            format!(
                "{:#08x}  {:<47}  |{}|",
                start as usize + i * 16,
                hex.join(" "),
                ascii
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_number("200"), Ok(200));
        assert_eq!(parse_number("0x10000"), Ok(65536));
        assert_eq!(parse_number("0XfF"), Ok(255));
        assert_eq!(parse_number("1_048_576"), Ok(1_048_576));
        assert!(parse_number("-1").is_err());
        assert!(parse_number("0xZZ").is_err());
    }

    #[test]
    fn hexdump_rows() {
        let lines = hexdump(0x100, b"Hello, JBOD!\x00\x01\x02\x03\xff");
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0x000100  48 65 6c 6c 6f 2c 20 4a 42 4f 44 21 00 01 02 03  |Hello, JBOD!....|"
        );
        assert!(lines[1].starts_with("0x000110  ff"));
        assert!(lines[1].ends_with("|.|"));
    }
}
