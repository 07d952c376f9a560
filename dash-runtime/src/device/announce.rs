use crate::device::{Press, Trigger, TriggerError};
use std::io::{self, Write};

/// "time" for a count of one, "times" for everything else.
pub fn times(count: u64) -> &'static str {
    if count == 1 {
        "time"
    } else {
        "times"
    }
}

/// Writes a short notice for every press:
///
/// ```text
/// Razors needed! Triggered by "Gillette button #2"
/// Pushed 2 times
/// ```
pub struct Announce {
    headline: String,
    out: Box<dyn Write + Send>,
}

impl Announce {
    /// Announces on standard output.
    pub fn stdout(headline: impl Into<String>) -> Self {
        Announce::to_writer(headline, io::stdout())
    }

    pub fn to_writer(headline: impl Into<String>, out: impl Write + Send + 'static) -> Self {
        Announce {
            headline: headline.into(),
            out: Box::new(out),
        }
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }
}

impl Trigger for Announce {
    fn fire(&mut self, press: &Press<'_>) -> Result<(), TriggerError> {
        if self.headline.is_empty() {
            writeln!(self.out, "Triggered by \"{}\"", press.name)?;
        } else {
            writeln!(self.out, "{} Triggered by \"{}\"", self.headline, press.name)?;
        }
        writeln!(self.out, "Pushed {} {}", press.count, times(press.count))?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Device;
    use crate::utils::test::SharedBuffer;
    use dash_packets::MacAddr;

    #[test]
    fn pluralisation() {
        assert_eq!(times(0), "times");
        assert_eq!(times(1), "time");
        assert_eq!(times(2), "times");
        assert_eq!(times(11), "times");
    }

    #[test]
    fn first_press_is_singular_then_plural() {
        let buffer = SharedBuffer::new();
        let mut device = Device::new(
            "Gillette button #2",
            MacAddr::new([0xac, 0x63, 0xbe, 0xb2, 0xa2, 0x05]),
            Announce::to_writer("Razors needed!", buffer.clone()),
        );

        device.action();
        assert_eq!(
            buffer.take_string(),
            "Razors needed! Triggered by \"Gillette button #2\"\nPushed 1 time\n"
        );

        device.action();
        assert_eq!(
            buffer.take_string(),
            "Razors needed! Triggered by \"Gillette button #2\"\nPushed 2 times\n"
        );

        device.action();
        assert!(buffer.take_string().ends_with("Pushed 3 times\n"));
        assert_eq!(device.trigger_count(), 3);
    }

    #[test]
    fn empty_headline_is_omitted() {
        let buffer = SharedBuffer::new();
        let mut announce = Announce::to_writer("", buffer.clone());
        announce
            .fire(&Press {
                name: "hall",
                address: MacAddr::BROADCAST,
                count: 1,
            })
            .unwrap();
        assert_eq!(buffer.take_string(), "Triggered by \"hall\"\nPushed 1 time\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_reported_not_raised() {
        let mut announce = Announce::to_writer("x", BrokenPipe);
        let press = Press {
            name: "hall",
            address: MacAddr::BROADCAST,
            count: 1,
        };
        assert!(matches!(announce.fire(&press), Err(TriggerError::Io(_))));

        let mut device = Device::new("hall", MacAddr::BROADCAST, Announce::to_writer("x", BrokenPipe));
        device.action();
        assert_eq!(device.trigger_count(), 1);
    }
}
