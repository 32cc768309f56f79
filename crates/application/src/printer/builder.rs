use domain::printer::PrinterDescriptor;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = 0x0A;

/// Paper width in characters for the common 80mm roll
pub const LINE_WIDTH: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Minimal ESC/POS byte builder for connectivity tickets.
///
/// Full receipt layout belongs to the receipt formatter; this only covers what
/// a test page needs.
#[derive(Debug, Default)]
pub struct EscPosBuilder {
    buffer: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// ESC @
    pub fn initialize(mut self) -> Self {
        self.buffer.extend_from_slice(&[ESC, b'@']);
        self
    }

    /// ESC a n
    pub fn align(mut self, align: Align) -> Self {
        let n = match align {
            Align::Left => 0,
            Align::Center => 1,
            Align::Right => 2,
        };
        self.buffer.extend_from_slice(&[ESC, b'a', n]);
        self
    }

    /// ESC E n
    pub fn bold(mut self, on: bool) -> Self {
        self.buffer.extend_from_slice(&[ESC, b'E', u8::from(on)]);
        self
    }

    pub fn line(mut self, text: &str) -> Self {
        self.buffer.extend_from_slice(text.as_bytes());
        self.buffer.push(LF);
        self
    }

    /// `label` left and `value` right-aligned on one line
    pub fn pair(self, label: &str, value: &str) -> Self {
        let gap = LINE_WIDTH.saturating_sub(label.chars().count() + value.chars().count());
        let line = format!("{label}{}{value}", " ".repeat(gap.max(1)));
        self.line(&line)
    }

    pub fn rule(self) -> Self {
        self.line(&"-".repeat(LINE_WIDTH))
    }

    /// ESC d n
    pub fn feed(mut self, lines: u8) -> Self {
        self.buffer.extend_from_slice(&[ESC, b'd', lines]);
        self
    }

    /// GS V A 0: feed to the cutter and cut
    pub fn cut(mut self) -> Self {
        self.buffer.extend_from_slice(&[GS, b'V', b'A', 0]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buffer
    }
}

/// Ticket printed to confirm a printer is reachable
pub fn test_page(descriptor: &PrinterDescriptor, terminal_id: &str, printed_at: &str) -> Vec<u8> {
    EscPosBuilder::new()
        .initialize()
        .align(Align::Center)
        .bold(true)
        .line("PRINTER TEST")
        .bold(false)
        .line(&descriptor.name)
        .align(Align::Left)
        .rule()
        .pair("Printer", descriptor.id.as_str())
        .pair("Address", &descriptor.address)
        .pair("Terminal", terminal_id)
        .pair("Time", printed_at)
        .rule()
        .feed(3)
        .cut()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::PrinterId;

    #[test]
    fn test_builder_emits_control_codes() {
        let bytes = EscPosBuilder::new().initialize().line("A").cut().build();
        assert_eq!(bytes, vec![0x1B, 0x40, b'A', 0x0A, 0x1D, 0x56, 0x41, 0x00]);
    }

    #[test]
    fn test_pair_fills_line_width() {
        let bytes = EscPosBuilder::new().pair("Total", "12.50").build();
        let line = String::from_utf8(bytes).unwrap();
        assert_eq!(line.trim_end_matches('\n').len(), LINE_WIDTH);
        assert!(line.starts_with("Total "));
        assert!(line.ends_with("12.50\n"));
    }

    #[test]
    fn test_pair_keeps_a_space_when_too_long() {
        let long = "x".repeat(LINE_WIDTH);
        let bytes = EscPosBuilder::new().pair("Label", &long).build();
        let line = String::from_utf8(bytes).unwrap();
        assert!(line.starts_with("Label x"));
    }

    #[test]
    fn test_page_mentions_printer_and_ends_with_cut() {
        let descriptor = PrinterDescriptor::network(
            PrinterId::new("p1").unwrap(),
            "Front Counter",
            "192.168.1.50:9100",
        );
        let page = test_page(&descriptor, "till-1", "2024-01-01 10:00");

        let printable: String = page
            .iter()
            .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
            .collect();
        assert!(printable.contains("PRINTER TEST"));
        assert!(printable.contains("Front Counter"));
        assert!(printable.contains("192.168.1.50:9100"));
        assert!(printable.contains("till-1"));
        assert!(page.ends_with(&[0x1D, 0x56, 0x41, 0x00]));
    }
}
