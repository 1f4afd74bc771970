//! In-place `name = number` rewrites in text parameter files.
//!
//! Matches whole-word occurrences of `<name> = <number>` where the number is
//! an integer or float with optional sign and exponent, and replaces only the
//! number. Everything else in the file is left untouched.

use regex::Regex;
use std::fs;
use std::path::Path;

use nq_core::Real;

use crate::ParamResult;

const NUMBER: &str = r"[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?";

/// Replace the number in every `name = number` occurrence of `text`.
pub fn substitute(text: &str, name: &str, value: Real) -> ParamResult<String> {
    let pattern = format!(r"\b({})(\s*=\s*){}", regex::escape(name), NUMBER);
    let re = Regex::new(&pattern)?;
    let replaced = re.replace_all(text, |caps: &regex::Captures<'_>| {
        format!("{}{}{}", &caps[1], &caps[2], value)
    });
    Ok(replaced.into_owned())
}

/// Rewrite `name = number` occurrences in the file at `path`.
pub fn set_parameter_file(path: &Path, name: &str, value: Real) -> ParamResult<()> {
    let content = fs::read_to_string(path)?;
    let rewritten = substitute(&content, name, value)?;
    fs::write(path, rewritten)?;
    Ok(())
}

/// Rewrite several parameters in one file.
pub fn set_parameters_file(path: &Path, assignments: &[(&str, Real)]) -> ParamResult<()> {
    let mut content = fs::read_to_string(path)?;
    for (name, value) in assignments {
        content = substitute(&content, name, *value)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn replaces_number_in_place() {
        let text = "tau_m = 10.0\nv_rest = -65\n";
        let out = substitute(text, "tau_m", 12.5).unwrap();
        assert_eq!(out, "tau_m = 12.5\nv_rest = -65\n");
    }

    #[test]
    fn leaves_other_parameters_untouched() {
        let text = "a = 1\nab = 2\nb = 3\n";
        let out = substitute(text, "b", 9.0).unwrap();
        assert_eq!(out, "a = 1\nab = 2\nb = 9\n");
    }

    #[test]
    fn whole_word_only() {
        let text = "rate = 5\nfiring_rate = 7\n";
        let out = substitute(text, "rate", 2.0).unwrap();
        assert_eq!(out, "rate = 2\nfiring_rate = 7\n");
    }

    #[test]
    fn handles_signs_and_exponents() {
        let text = "g = -1.5e-3; delay = +2.; eta = .5E+2";
        let out = substitute(text, "g", 0.25).unwrap();
        assert_eq!(out, "g = 0.25; delay = +2.; eta = .5E+2");
        let out = substitute(&out, "eta", 50.0).unwrap();
        assert_eq!(out, "g = 0.25; delay = +2.; eta = 50");
    }

    #[test]
    fn preserves_spacing_around_equals() {
        let text = "J_E  =   0.1";
        let out = substitute(text, "J_E", 0.2).unwrap();
        assert_eq!(out, "J_E  =   0.2");
    }

    #[test]
    fn file_rewrite_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "eta = 2.0").unwrap();
        writeln!(file, "g = 5").unwrap();
        writeln!(file, "# comment: eta controls drive").unwrap();
        drop(file);

        set_parameter_file(&path, "eta", 3.25).unwrap();
        let once = fs::read(&path).unwrap();
        set_parameter_file(&path, "eta", 3.25).unwrap();
        let twice = fs::read(&path).unwrap();
        assert_eq!(once, twice);
        assert!(String::from_utf8(once).unwrap().contains("eta = 3.25"));
    }

    #[test]
    fn multiple_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.txt");
        fs::write(&path, "a = 1\nb = 2\n").unwrap();
        set_parameters_file(&path, &[("a", 10.0), ("b", 20.0)]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a = 10\nb = 20\n");
    }
}
