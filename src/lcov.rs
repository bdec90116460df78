/// Writer for the LCOV tracefile format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Emitted records, one block per source file:
///   SF:<absolute path to source file>
///   DA:<line number>,<execution count>
///   LF:<lines found>
///   LH:<lines hit>
///   end_of_record
///
/// Lines found are the statement lines of the file; a statement the profiler
/// never recorded is written with a count of 0. Files whose source could not
/// be parsed fall back to their recorded lines.
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use crate::report::{CoverageReport, FileOutcome};

pub fn write_lcov(report: &CoverageReport<'_>) -> String {
    let mut out = String::new();
    for outcome in &report.files {
        match outcome {
            FileOutcome::Ready(file) => {
                let lines: BTreeMap<u32, u64> = file
                    .statements
                    .iter()
                    .map(|line| (*line, file.file.lines.get(line).copied().unwrap_or(0)))
                    .collect();
                write_record(&mut out, &file.file.path, &lines);
            }
            FileOutcome::Failed { file, .. } => write_record(&mut out, &file.path, &file.lines),
        }
    }
    out
}

fn write_record(out: &mut String, path: &Path, lines: &BTreeMap<u32, u64>) {
    writeln!(out, "SF:{}", path.display()).unwrap();
    for (line, count) in lines {
        writeln!(out, "DA:{line},{count}").unwrap();
    }
    let hit = lines.values().filter(|&&count| count > 0).count();
    writeln!(out, "LF:{}", lines.len()).unwrap();
    writeln!(out, "LH:{hit}").unwrap();
    writeln!(out, "end_of_record").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Coverage;
    use crate::grammar::LuaGrammar;
    use crate::model::FileCoverage;
    use crate::report::build_report;

    #[test]
    fn test_statements_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.lua");
        let bad = dir.path().join("bad.lua");
        std::fs::write(&good, "local a = 1\n\nprint(a)\nprint(2)\n").unwrap();
        std::fs::write(&bad, "local = = 1\n").unwrap();

        let mut cov = Coverage::default();
        let mut file = FileCoverage::new(good.clone());
        file.record(1, 4);
        file.record(2, 9);
        file.record(3, 0);
        cov.files.push(file);
        let mut file = FileCoverage::new(bad.clone());
        file.record(1, 2);
        cov.files.push(file);

        let report = build_report(&cov, None, &LuaGrammar);
        let out = write_lcov(&report);

        let expected = format!(
            "SF:{}\nDA:1,4\nDA:3,0\nDA:4,0\nLF:3\nLH:1\nend_of_record\n\
             SF:{}\nDA:1,2\nLF:1\nLH:1\nend_of_record\n",
            good.display(),
            bad.display()
        );
        assert_eq!(out, expected);
    }
}
