use std::panic;

use mdpress_core::{ConvertOptions, Document, convert};

const CASES: usize = 200;
const MAX_LEN: usize = 512;
const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 \
\n\t#*`[]()!<>&-_=./\\\\\"";

#[test]
fn converter_never_panics_on_random_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x4c1d_9b37_aa02_6e8d);
    for case in 0..CASES {
        let len = rng.gen_range(0, MAX_LEN + 1);
        let source = random_string(&mut rng, len);
        let result = panic::catch_unwind(|| {
            convert(&Document::new(&source), &ConvertOptions::default())
        });
        if result.is_err() {
            return Err(format!("convert panicked for case {}: {:?}", case, source).into());
        }
    }
    Ok(())
}

#[test]
fn list_runs_are_balanced_on_random_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x88af_10c3_5d77_2b41);
    for case in 0..CASES {
        let len = rng.gen_range(0, MAX_LEN + 1);
        let source = random_string(&mut rng, len);
        let fragments = convert(&Document::new(&source), &ConvertOptions::default());
        let mut depth: i64 = 0;
        for fragment in &fragments {
            match fragment.as_str() {
                "<ul>" => depth += 1,
                "</ul>" => depth -= 1,
                _ => {}
            }
            if !(0..=1).contains(&depth) {
                return Err(format!(
                    "list depth {} out of range for case {}\nSource:\n---\n{}\n---",
                    depth, case, source
                )
                .into());
            }
        }
        if depth != 0 {
            return Err(format!(
                "list run left open for case {}\nSource:\n---\n{}\n---",
                case, source
            )
            .into());
        }
    }
    Ok(())
}

#[test]
fn code_blocks_are_balanced_on_random_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x1f33_c0de_98e4_7a52);
    for case in 0..CASES {
        let len = rng.gen_range(0, MAX_LEN + 1);
        let source = random_string(&mut rng, len);
        let fragments = convert(&Document::new(&source), &ConvertOptions::default());
        let opened = fragments
            .iter()
            .filter(|fragment| fragment.as_str() == "<pre><code>")
            .count();
        let closed = fragments
            .iter()
            .filter(|fragment| fragment.as_str() == "</code></pre>")
            .count();
        if opened != closed {
            return Err(format!(
                "unbalanced code blocks ({} open, {} close) for case {}\nSource:\n---\n{}\n---",
                opened, closed, case, source
            )
            .into());
        }
    }
    Ok(())
}

#[test]
fn conversion_is_deterministic_on_random_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0xe0b2_41d5_337f_9c16);
    for case in 0..CASES {
        let len = rng.gen_range(0, MAX_LEN + 1);
        let source = random_string(&mut rng, len);
        let document = Document::new(&source);
        let first = convert(&document, &ConvertOptions::default());
        let second = convert(&document, &ConvertOptions::default());
        if first != second {
            return Err(format!("non-deterministic output for case {}", case).into());
        }
    }
    Ok(())
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn gen_range(&mut self, low: usize, high: usize) -> usize {
        low + (self.next() as usize) % (high - low)
    }
}

fn random_string(rng: &mut Lcg, len: usize) -> String {
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let idx = rng.gen_range(0, CHARSET.len());
        out.push(CHARSET[idx] as char);
    }
    out
}
