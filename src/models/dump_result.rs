/// Result of the database dump step. A failed dump does not stop the run,
/// so the outcome travels with the run instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpResult {
    pub ok: bool,
    pub detail: String,
}

impl DumpResult {
    pub fn succeeded(detail: impl Into<String>) -> Self {
        DumpResult {
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        DumpResult {
            ok: false,
            detail: detail.into(),
        }
    }

    /// Short status for the end-of-run summary
    pub fn status(&self) -> &'static str {
        if self.ok {
            "ok"
        } else {
            "FAILED"
        }
    }
}
