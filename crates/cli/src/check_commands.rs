use std::{io::Read, path::Path};

use anyhow::{Context, Result};

use tougao_submission::{SubmissionFields, format};

pub fn handle_check(file: Option<&Path>) -> Result<()> {
    let caption = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read caption from stdin")?;
            raw
        },
    };

    match format::validate(&normalize(&caption)) {
        Ok(fields) => {
            print!("{}", render_fields(&fields));
            Ok(())
        },
        Err(err) => {
            eprintln!("rejected: {err}");
            std::process::exit(1);
        },
    }
}

/// Editors and shells leave a trailing newline and CRLF line endings that a
/// Telegram caption never carries.
fn normalize(caption: &str) -> String {
    let caption = caption.replace("\r\n", "\n");
    match caption.strip_suffix('\n') {
        Some(stripped) => stripped.to_string(),
        None => caption,
    }
}

fn render_fields(fields: &SubmissionFields) -> String {
    format!(
        "name:        {}\ndescription: {}\nlink:        {}\nsize:        {}\ntags:        {}\n",
        fields.name, fields.description, fields.link, fields.size, fields.tags
    )
}
