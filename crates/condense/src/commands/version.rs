use condense_compress::SCHEMA_VERSION;

pub(crate) fn version_text() -> String {
    format!(
        "condense {}\nHeuristic compression for source files, documents and multi-agent transcripts\ncache schema v{}",
        env!("CARGO_PKG_VERSION"),
        SCHEMA_VERSION
    )
}

pub fn run() -> anyhow::Result<()> {
    println!("{}", version_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_output() {
        let text = version_text();
        assert!(text.starts_with(&format!("condense {}", env!("CARGO_PKG_VERSION"))));
        assert!(text.contains("cache schema"));
    }
}
