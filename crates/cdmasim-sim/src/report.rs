//! Text Reports
//!
//! Human-readable rendering of simulation results through `Display`. Bit
//! sequences are printed in full as `'0'`/`'1'` strings; chip-rate signals
//! are truncated with [`format_signal`].

use crate::cdma::{CdmaResult, DataSource, UserResult};
use crate::link::LinkResult;
use std::fmt;

/// Samples shown for chip-rate signals.
pub const SIGNAL_DISPLAY_LIMIT: usize = 40;
/// Values shown for per-bit correlation sums.
pub const CORRELATION_DISPLAY_LIMIT: usize = 20;

const RULE: &str = "======================================================";

/// Render up to `limit` samples with two decimals, comma separated.
///
/// A `...` suffix marks truncation. `None` renders every sample.
pub fn format_signal(signal: &[f64], limit: Option<usize>) -> String {
    let shown = limit.map_or(signal.len(), |l| l.min(signal.len()));
    let mut out = String::with_capacity(shown * 7);
    for (i, value) in signal[..shown].iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{:.2}", value));
    }
    if shown < signal.len() {
        out.push_str("...");
    }
    out
}

fn percent(ber: f64) -> String {
    format!("{:.2}%", ber * 100.0)
}

fn input_text(data: &DataSource) -> &str {
    data.text().unwrap_or("")
}

fn write_user_path(f: &mut fmt::Formatter<'_>, label: char, user: &UserResult) -> fmt::Result {
    writeln!(f, "User {} Path:", label)?;
    if user.fallback {
        writeln!(f, "  (no data requested, one random bit sent)")?;
    }
    writeln!(f, "  Original {}: {}", label, user.original)?;
    writeln!(f, "  Encoded {}: {}", label, user.encoded)?;
    writeln!(
        f,
        "  Transmitted {} (trunc): {}",
        label,
        format_signal(&user.transmitted, Some(SIGNAL_DISPLAY_LIMIT))
    )?;
    writeln!(f)
}

fn write_user_decoding(f: &mut fmt::Formatter<'_>, label: char, user: &UserResult) -> fmt::Result {
    writeln!(f, "User {} Decoding:", label)?;
    writeln!(
        f,
        "  Correlated {} (trunc): {}",
        label,
        format_signal(&user.correlation_sums, Some(CORRELATION_DISPLAY_LIMIT))
    )?;
    writeln!(f, "  Decoded {}: {}", label, user.decoded)?;
    writeln!(
        f,
        "  Decoded Text {}: \"{}\"",
        label,
        user.decoded_text.as_deref().unwrap_or("")
    )?;
    writeln!(
        f,
        "  BER {}: {}, Errors {}: {}/{}",
        label,
        percent(user.ber),
        label,
        user.errors,
        user.data_bits()
    )?;
    writeln!(f)
}

impl fmt::Display for CdmaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        let m = &self.metrics;

        writeln!(f, "CDMA Simulation Results - Timestamp: {}", self.timestamp.to_rfc2822())?;
        writeln!(f, "{}", RULE)?;
        writeln!(f)?;

        writeln!(f, "Input Parameters:")?;
        writeln!(f, "  Gold Code N: {}", p.width)?;
        writeln!(f, "  Poly1 Taps: {:?}, Poly2 Taps: {:?}", p.poly1, p.poly2)?;
        writeln!(
            f,
            "  User A Seeds (L1/L2): 0x{:X} / 0x{:X}",
            p.user_a.seed1, p.user_a.seed2
        )?;
        writeln!(
            f,
            "  User B Seeds (L1/L2): 0x{:X} / 0x{:X}{}",
            p.user_b.seed1,
            p.user_b.seed2,
            if self.seeds_adjusted { " (adjusted)" } else { "" }
        )?;
        writeln!(f, "  Noise Level: {:.4}", p.noise_std)?;
        writeln!(
            f,
            "  Input Text A: \"{}\", Input Text B: \"{}\"",
            input_text(&p.user_a.data),
            input_text(&p.user_b.data)
        )?;
        for (label, data) in [('A', &p.user_a.data), ('B', &p.user_b.data)] {
            if let DataSource::Random(bits) = data {
                writeln!(f, "  Random Seq Length {}: {} bits", label, bits)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Data Lengths & Codes:")?;
        writeln!(
            f,
            "  User A Data Bits: {}, User B Data Bits: {}",
            self.user_a.data_bits(),
            self.user_b.data_bits()
        )?;
        writeln!(f, "  Gold Code Length: {}", m.code_length)?;
        writeln!(f, "  User A Gold Code: {}", self.user_a.code)?;
        writeln!(f, "  User B Gold Code: {}", self.user_b.code)?;
        writeln!(f)?;

        writeln!(f, "Code Properties:")?;
        writeln!(
            f,
            "  Autocorr Peak: {}, Max Off-Peak A: {:.4}, Max Off-Peak B: {:.4}",
            m.autocorrelation_peak, m.max_off_peak_a, m.max_off_peak_b
        )?;
        writeln!(f, "  Cross-Correlation (A vs B): {:.4}", m.cross_correlation)?;
        writeln!(
            f,
            "  Max Cross-Correlation (all lags): {:.4}, Gold Bound: {:.4}",
            m.max_cross_correlation, m.cross_correlation_bound
        )?;
        writeln!(f, "  Processing Gain: {:.2} dB", m.processing_gain_db)?;
        writeln!(f)?;

        write_user_path(f, 'A', &self.user_a)?;
        write_user_path(f, 'B', &self.user_b)?;

        writeln!(f, "Channel & Reception:")?;
        writeln!(f, "  Channel SNR: {:.2} dB", self.snr_db)?;
        writeln!(
            f,
            "  Combined (trunc): {}",
            format_signal(&self.combined, Some(SIGNAL_DISPLAY_LIMIT))
        )?;
        writeln!(
            f,
            "  Received (trunc): {}",
            format_signal(&self.received, Some(SIGNAL_DISPLAY_LIMIT))
        )?;
        writeln!(
            f,
            "  Rx Segment A (trunc): {}, Rx Segment B (trunc): {}",
            format_signal(self.received_segment(&self.user_a), Some(SIGNAL_DISPLAY_LIMIT)),
            format_signal(self.received_segment(&self.user_b), Some(SIGNAL_DISPLAY_LIMIT))
        )?;
        writeln!(f)?;

        write_user_decoding(f, 'A', &self.user_a)?;
        write_user_decoding(f, 'B', &self.user_b)?;

        writeln!(f, "{}", RULE)?;
        writeln!(f, "End of CDMA Report")
    }
}

impl fmt::Display for LinkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        let text = p.data.text();

        writeln!(f, "Simulation Results - Timestamp: {}", self.timestamp.to_rfc2822())?;
        writeln!(f, "{}", RULE)?;
        writeln!(f)?;

        writeln!(f, "Input Parameters:")?;
        writeln!(f, "  Input Text: {}", text.unwrap_or(""))?;
        writeln!(f, "  Gold Code N: {}", p.width)?;
        writeln!(f, "  Gold Taps1: {:?}", p.poly1)?;
        writeln!(f, "  Gold Taps2: {:?}", p.poly2)?;
        writeln!(f, "  Seeds (L1/L2): 0x{:X} / 0x{:X}", p.seed1, p.seed2)?;
        writeln!(f, "  Decoder: {}", if p.decode { "gold" } else { "disabled" })?;
        writeln!(f, "  Error Type: {}", p.error_pattern)?;
        writeln!(f, "  Error Rate: {:.2}%", p.error_rate)?;
        writeln!(f)?;

        writeln!(f, "Generated/Processed Sequences:")?;
        writeln!(f, "  Original (len {}): {}", self.original.len(), self.original)?;
        if let Some(t) = text {
            writeln!(f, "  Original ASCII: {}", t)?;
        }
        writeln!(f, "  Gold Code (len {}): {}", self.code.len(), self.code)?;
        writeln!(f, "  Encoded (len {}): {}", self.encoded.len(), self.encoded)?;
        writeln!(f, "  Corrupted (len {}): {}", self.corrupted.len(), self.corrupted)?;
        writeln!(f, "  Errors Introduced: {}", self.errors_introduced)?;
        match &self.decoding {
            Some(d) => {
                writeln!(f, "  Decoded (len {}): {}", d.decoded.len(), d.decoded)?;
                if let Some(t) = &d.decoded_text {
                    writeln!(f, "  Decoded ASCII: {}", t)?;
                }
            }
            None => writeln!(f, "  Decoded Sequence: Not available / Decoder disabled")?,
        }
        writeln!(f)?;

        writeln!(f, "Analysis Results:")?;
        match &self.decoding {
            Some(d) => {
                writeln!(f, "  BER: {:.4} ({})", d.ber, percent(d.ber))?;
                writeln!(
                    f,
                    "  Error Count (vs Original): {} / {} bits",
                    d.errors,
                    self.original.len()
                )?;
            }
            None => writeln!(f, "  BER: Not calculated / Decoder disabled")?,
        }
        writeln!(f)?;

        writeln!(f, "Autocorrelation (Max Absolute Off-Peak):")?;
        writeln!(f, "  Original: {:.4}", self.autocorrelation.original)?;
        writeln!(f, "  Encoded: {:.4}", self.autocorrelation.encoded)?;
        writeln!(f, "  Corrupted: {:.4}", self.autocorrelation.corrupted)?;
        writeln!(f)?;

        writeln!(f, "{}", RULE)?;
        writeln!(f, "End of Report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdma::{CdmaParams, CdmaSimulator, UserParams};
    use crate::link::{LinkParams, LinkSimulator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_format_signal_truncates() {
        let signal: Vec<f64> = (0..50).map(|i| i as f64 * 0.5).collect();
        let s = format_signal(&signal, Some(3));
        assert_eq!(s, "0.00, 0.50, 1.00...");
        assert_eq!(format_signal(&[1.0, -2.25], Some(40)), "1.00, -2.25");
        assert_eq!(format_signal(&[1.0, -1.0], None), "1.00, -1.00");
        assert_eq!(format_signal(&[], Some(5)), "");
    }

    #[test]
    fn test_cdma_report_contains_codes() {
        let sim = CdmaSimulator::new(CdmaParams {
            noise_std: 0.0,
            ..Default::default()
        })
        .unwrap();
        let result = sim.run(&mut StdRng::seed_from_u64(1)).unwrap();
        let report = result.to_string();

        assert!(report.starts_with("CDMA Simulation Results - Timestamp: "));
        assert!(report.contains(&format!("  User A Gold Code: {}\n", result.user_a.code)));
        assert!(report.contains(&format!("  User B Gold Code: {}\n", result.user_b.code)));
        assert!(report.contains("  User A Seeds (L1/L2): 0x1 / 0x2AA\n"));
        assert!(report.contains("Input Text A: \"Hello\", Input Text B: \"World\""));
        assert!(report.contains("  Decoded Text A: \"Hello\"\n"));
        assert!(report.contains("  BER B: 0.00%, Errors B: 0/40\n"));
        assert!(report.contains("  Channel SNR: inf dB\n"));
        assert!(report.ends_with("End of CDMA Report\n"));
    }

    #[test]
    fn test_cdma_report_marks_adjusted_seeds() {
        let sim = CdmaSimulator::new(CdmaParams {
            user_b: UserParams::new(1, 0b1010101010, DataSource::Random(8)),
            ..Default::default()
        })
        .unwrap();
        let report = sim.run(&mut StdRng::seed_from_u64(2)).unwrap().to_string();
        assert!(report.contains("0x1 / 0x2A9 (adjusted)"));
        assert!(report.contains("  Random Seq Length B: 8 bits\n"));
    }

    #[test]
    fn test_link_report() {
        let sim = LinkSimulator::new(LinkParams {
            data: DataSource::Text("A".to_string()),
            ..Default::default()
        })
        .unwrap();
        let report = sim.run(&mut StdRng::seed_from_u64(1)).unwrap().to_string();
        assert!(report.contains("  Original (len 8): 01000001\n"));
        assert!(report.contains("  Decoded ASCII: A\n"));
        assert!(report.contains("  BER: 0.0000 (0.00%)\n"));
        assert!(report.contains("  Error Type: random\n"));
        assert!(report.ends_with("End of Report\n"));
    }
}
