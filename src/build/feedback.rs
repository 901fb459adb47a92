use colored::*;

/// Watches compiler stderr line by line and remembers the first actionable hint.
#[derive(Debug, Default)]
pub struct FeedbackAnalyzer {
    hint: Option<String>,
}

impl FeedbackAnalyzer {
    pub fn observe(&mut self, line: &str) {
        if self.hint.is_none() {
            self.hint = Self::analyze(line);
        }
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn analyze(line: &str) -> Option<String> {
        // 1. No entry point among the staged files
        if line.contains("undefined reference to `main'")
            || line.contains("undefined reference to 'main'")
            || line.contains("entry point must be defined")
        {
            return Some(format!(
                "None of the staged files defines {}.\nCheck that {} points at the directory holding your entry point.",
                "main()".bold().yellow(),
                "src".bold().green()
            ));
        }

        // 2. Something defined elsewhere was never compiled in
        if line.contains("undefined reference to") || line.contains("ld returned 1 exit status") {
            return Some(format!(
                "It looks like a {} error.\nA definition may live in a file whose extension is not listed in {}.",
                "Linker".bold().red(),
                "includeFileTypes".bold().yellow()
            ));
        }

        // 3. Missing header
        if line.contains("fatal error: ") && line.contains("No such file or directory") {
            return Some(format!(
                "It looks like a {} error.\nCheck the relative include paths under your {} directory.",
                "Missing Header".bold().red(),
                "src".bold().yellow()
            ));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linker_error() {
        let msg = FeedbackAnalyzer::analyze("util.cpp:(.text+0x5): undefined reference to `helper()'")
            .unwrap();
        assert!(msg.contains("Linker"));
        assert!(msg.contains("includeFileTypes"));
    }

    #[test]
    fn test_include_error() {
        let msg = FeedbackAnalyzer::analyze("main.cpp:1:10: fatal error: foo.h: No such file or directory")
            .unwrap();
        assert!(msg.contains("Missing Header"));
    }

    #[test]
    fn test_main_error() {
        let msg = FeedbackAnalyzer::analyze("undefined reference to `main'").unwrap();
        assert!(msg.contains("main()"));
    }

    #[test]
    fn test_first_hint_wins() {
        let mut analyzer = FeedbackAnalyzer::default();
        analyzer.observe("main.cpp: In function 'int main()':");
        assert!(analyzer.hint().is_none());
        analyzer.observe("fatal error: x.h: No such file or directory");
        analyzer.observe("undefined reference to `main'");
        assert!(analyzer.hint().unwrap().contains("Missing Header"));
    }
}
