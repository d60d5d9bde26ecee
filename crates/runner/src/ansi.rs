/// Color sequences emitted by the migasfree client.
const CLIENT_COLOR_CODES: [&str; 4] = ["\x1b[92m", "\x1b[91m", "\x1b[32m", "\x1b[0m"];

/// Removes the client's color escape sequences from an output line.
///
/// Only the sequences the client actually emits are removed; any other
/// escape is passed through untouched.
pub fn clean_line(line: &str) -> String {
    let mut cleaned = line.to_owned();
    for code in CLIENT_COLOR_CODES {
        if cleaned.contains(code) {
            cleaned = cleaned.replace(code, "");
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_green_and_reset() {
        assert_eq!(clean_line("\x1b[92mOK\x1b[0m"), "OK");
    }

    #[test]
    fn strips_every_client_code() {
        let line = "\x1b[91mfail\x1b[0m \x1b[32mdone\x1b[0m";
        assert_eq!(clean_line(line), "fail done");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(clean_line("Uploading hardware..."), "Uploading hardware...");
    }

    #[test]
    fn other_escapes_pass_through() {
        assert_eq!(clean_line("\x1b[1mbold\x1b[0m"), "\x1b[1mbold");
    }
}
