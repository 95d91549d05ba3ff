//! Text rendering of capture records.
//!
//! A record renders as
//!
//! ```text
//! [INCOMING] 14:03:07.512093 (10 bytes)\tAT+CSQ\r\n\x1a  41 54 2b 43 53 51 0d 0a
//!                                      \t\x1a\x1b       1a 1b
//! ```
//!
//! followed by a blank line. The text column escapes anything outside
//! printable ASCII, so one byte takes at most four characters (`\x1a`) and the
//! column is padded to `columns * 4`.

use crate::data_capture::CaptureRecord;

pub const DEFAULT_COLUMNS: usize = 8;

const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.6f";

pub fn header(record: &CaptureRecord) -> String {
    format!(
        "[{}] {} ({} bytes)",
        record.direction().label(),
        record.captured_at().format(TIMESTAMP_FORMAT),
        record.len()
    )
}

/// Printable ASCII (quotes included) passes through; `\\`, `\t`, `\n` and
/// `\r` get their short escapes and every other byte becomes `\xNN`.
pub fn escape_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out
}

pub fn hex_column(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One body line without its leading indent and tab.
pub fn body_line(bytes: &[u8], columns: usize) -> String {
    format!(
        "{:<width$} {}",
        escape_text(bytes),
        hex_column(bytes),
        width = columns * 4
    )
}

pub fn render_record(record: &CaptureRecord, columns: usize) -> String {
    let columns = columns.max(1);
    let header = header(record);
    let indent = " ".repeat(header.len());

    let mut out = header;
    if record.is_empty() {
        out.push('\n');
    }
    for (i, chunk) in record.payload().chunks(columns).enumerate() {
        if i > 0 {
            out.push_str(&indent);
        }
        out.push('\t');
        out.push_str(&body_line(chunk, columns));
        out.push('\n');
    }
    out.push('\n');
    out
}

pub fn render_banner(port: &str, baud_rate: u32, proxy: &str) -> String {
    format!(
        "SerialSniff\n\nport:\t\t{}\nbaudrate:\t{}\nproxy:\t\t{}\n\n",
        port, baud_rate, proxy
    )
}
