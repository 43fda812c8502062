//! Batch driver: lints many files on a scoped worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::SegQueue;
use tracing::debug;

use super::{FixOutcome, LintedFile, Linter, SourceFile};
use crate::rewrite::FixError;

/// Runs a [`Linter`] over a batch of files concurrently.
///
/// Workers pull the next file index from a shared cursor, so uneven file
/// sizes balance out. Results come back in input order.
pub struct Driver<'l> {
    linter: &'l Linter,
    jobs: usize,
}

impl<'l> Driver<'l> {
    /// Worker count from the linter's config, else one per CPU.
    pub fn new(linter: &'l Linter) -> Self {
        let jobs = linter.config().jobs.unwrap_or_else(num_cpus::get);
        Self::with_jobs(linter, jobs)
    }

    pub fn with_jobs(linter: &'l Linter, jobs: usize) -> Self {
        Self {
            linter,
            jobs: jobs.max(1),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Lint every file.
    pub fn lint_batch(&self, files: &[SourceFile]) -> Vec<LintedFile> {
        self.run(files, |linter, file| linter.lint_file(file))
    }

    /// [`Linter::fix_all`] every file.
    pub fn fix_batch(
        &self,
        files: &[SourceFile],
        preference: &[&str],
    ) -> Vec<Result<FixOutcome, FixError>> {
        self.run(files, |linter, file| {
            linter.fix_all(&file.text, &file.path, preference)
        })
    }

    fn run<T, F>(&self, files: &[SourceFile], work: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Linter, &SourceFile) -> T + Sync,
    {
        let workers = self.jobs.min(files.len());
        debug!(files = files.len(), workers, "starting batch");
        if workers <= 1 {
            return files.iter().map(|f| work(self.linter, f)).collect();
        }

        let cursor = AtomicUsize::new(0);
        let done = SegQueue::new();
        let scope = crossbeam::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|_| loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(file) = files.get(index) else {
                        break;
                    };
                    done.push((index, work(self.linter, file)));
                });
            }
        });
        if let Err(panic) = scope {
            std::panic::resume_unwind(panic);
        }

        let mut results: Vec<(usize, T)> = Vec::with_capacity(files.len());
        while let Some(entry) = done.pop() {
            results.push(entry);
        }
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<SourceFile> {
        (0..n)
            .map(|i| {
                let body = if i % 2 == 0 {
                    "try { } catch (Exception ex) { throw ex; }"
                } else {
                    "Run();"
                };
                SourceFile::new(
                    format!("f{}.cs", i),
                    format!("class C{} {{ void M() {{ {} }} }}", i, body),
                )
            })
            .collect()
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let linter = Linter::new();
        let files = files(23);
        let results = Driver::with_jobs(&linter, 4).lint_batch(&files);
        assert_eq!(results.len(), 23);
        for (i, linted) in results.iter().enumerate() {
            assert_eq!(linted.result.file_path, format!("f{}.cs", i));
            assert_eq!(linted.result.diagnostics.len(), usize::from(i % 2 == 0));
        }
    }

    #[test]
    fn test_batch_matches_sequential() {
        let linter = Linter::new();
        let files = files(9);
        let parallel = Driver::with_jobs(&linter, 3).lint_batch(&files);
        let sequential = Driver::with_jobs(&linter, 1).lint_batch(&files);
        let codes = |results: &[LintedFile]| -> Vec<Vec<&'static str>> {
            results
                .iter()
                .map(|r| r.result.diagnostics.iter().map(|d| d.code).collect())
                .collect()
        };
        assert_eq!(codes(&parallel), codes(&sequential));
    }

    #[test]
    fn test_fix_batch() {
        let linter = Linter::new();
        let outcomes = Driver::with_jobs(&linter, 2).fix_batch(&files(4), &["bare-rethrow"]);
        assert_eq!(outcomes.len(), 4);
        let first = outcomes[0].as_ref().unwrap();
        assert!(first.text.contains("throw;"));
        assert!(!outcomes[1].as_ref().unwrap().changed());
    }

    #[test]
    fn test_empty_batch() {
        let linter = Linter::new();
        assert!(Driver::new(&linter).lint_batch(&[]).is_empty());
    }
}
