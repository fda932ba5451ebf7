use anyhow::{ensure, Context, Result};
use indexmap::IndexSet;
use std::path::Path;

/// Load class names from a file with one name per line.
pub async fn load_classes_file(path: impl AsRef<Path>) -> Result<IndexSet<String>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read classes file '{}'", path.display()))?;
    let lines: Vec<_> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();
    let classes: IndexSet<_> = lines.iter().cloned().map(ToOwned::to_owned).collect();
    ensure!(
        lines.len() == classes.len(),
        "duplicated class names found in '{}'",
        path.display()
    );
    ensure!(
        !classes.is_empty(),
        "no classes found in '{}'",
        path.display()
    );
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn classes_file_is_read_line_by_line() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let path = dir.path().join("classes.txt");
        std::fs::write(&path, "dog\ncat\n\nbird\n")?;
        let classes = load_classes_file(&path).await?;
        assert_eq!(classes.iter().collect::<Vec<_>>(), ["dog", "cat", "bird"]);

        let path = dir.path().join("duplicated.txt");
        std::fs::write(&path, "dog\ncat\ndog\n")?;
        assert!(load_classes_file(&path).await.is_err());

        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "\n")?;
        assert!(load_classes_file(&path).await.is_err());

        Ok(())
    }
}
