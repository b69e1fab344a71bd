// crates/stylescope-cli/src/commands/mod.rs
//
// Command module declarations for the StyleScope CLI.

pub mod analyze;
pub mod embed;
pub mod presets;
pub mod probe;
pub mod shuffle;
pub mod status;

use std::path::PathBuf;

use crate::output::OutputFormat;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub rpc: String,
    pub format: OutputFormat,
}

/// Input text from the positional argument or `--file`, exactly one of them.
pub fn read_text(
    text: Option<&str>,
    file: Option<&PathBuf>,
) -> Result<String, Box<dyn std::error::Error>> {
    match (text, file) {
        (Some(t), None) => Ok(t.to_string()),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (Some(_), Some(_)) => Err("give either TEXT or --file, not both".into()),
        (None, None) => Err("no input: give TEXT or --file".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_requires_exactly_one_source() {
        assert_eq!(read_text(Some("hi"), None).unwrap(), "hi");
        assert!(read_text(None, None).is_err());
        assert!(read_text(Some("hi"), Some(&PathBuf::from("x.txt"))).is_err());
    }

    #[test]
    fn test_read_text_from_file() {
        let path = std::env::temp_dir().join("stylescope-cli-read-text.txt");
        std::fs::write(&path, "from a file").unwrap();
        assert_eq!(read_text(None, Some(&path)).unwrap(), "from a file");
        let _ = std::fs::remove_file(path);
    }
}
