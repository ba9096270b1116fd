use crate::ast::Frontmatter;
use crate::{SyntaxError, SyntaxResult};
use miette::SourceSpan;
use mtm_source::{LineIndex, Target};

/// The frontmatter of a file together with where the body starts.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterBlock {
    pub frontmatter: Frontmatter,
    /// Byte range of the YAML text between the delimiters
    pub yaml: Option<std::ops::Range<usize>>,
    /// First byte after the closing delimiter line
    pub body_start: usize,
}

/// Splits a leading `---` delimited YAML block off `source`.
///
/// Files without a frontmatter block get the default frontmatter and a
/// body starting at byte 0. An opening delimiter without a closing one is
/// an error.
pub fn split_frontmatter(source: &str, index: &LineIndex<'_>) -> SyntaxResult<FrontmatterBlock> {
    let leading = source.len() - source.trim_start_matches(['\u{feff}', ' ', '\t', '\r', '\n']).len();
    let rest = &source[leading..];
    let Some(after_open) = strip_delimiter(rest) else {
        return Ok(FrontmatterBlock {
            frontmatter: Frontmatter::default(),
            yaml: None,
            body_start: 0,
        });
    };

    let yaml_start = leading + (rest.len() - after_open.len());
    let mut line_start = yaml_start;
    let close = loop {
        if line_start >= source.len() {
            break None;
        }
        let line_end = source[line_start..]
            .find('\n')
            .map(|offset| line_start + offset + 1)
            .unwrap_or(source.len());
        if source[line_start..line_end].trim_end() == "---" {
            break Some((line_start, line_end));
        }
        line_start = line_end;
    };

    let Some((yaml_end, body_start)) = close else {
        return Err(SyntaxError::Frontmatter {
            message: "missing closing '---' delimiter".to_string(),
            location: index.location(leading),
            span: SourceSpan::new(leading.into(), 3),
        });
    };

    let yaml = &source[yaml_start..yaml_end];
    check_target(yaml, yaml_start, index)?;
    let frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|err| {
            let offset = err
                .location()
                .map(|location| yaml_start + location.index())
                .unwrap_or(yaml_start)
                .min(yaml_end);
            SyntaxError::Frontmatter {
                message: strip_yaml_position(&err.to_string()),
                location: index.location(offset),
                span: SourceSpan::new(offset.into(), 0),
            }
        })?
    };

    log::trace!("Frontmatter spans bytes {}..{}", yaml_start, yaml_end);
    Ok(FrontmatterBlock {
        frontmatter,
        yaml: Some(yaml_start..yaml_end),
        body_start,
    })
}

/// Rejects a `target:` line naming a framework outside [`Target`], before
/// serde turns it into a generic YAML error.
fn check_target(yaml: &str, yaml_start: usize, index: &LineIndex<'_>) -> SyntaxResult<()> {
    let mut line_start = 0;
    for line in yaml.split_inclusive('\n') {
        let offset = line_start;
        line_start += line.len();
        let Some(value) = line.strip_prefix("target:") else {
            continue;
        };
        let value = value.split(" #").next().unwrap_or(value);
        let name = value.trim().trim_matches(['"', '\'']);
        if name.is_empty() || name.parse::<Target>().is_ok() {
            return Ok(());
        }
        let value_start = yaml_start + offset + "target:".len() + (value.len() - value.trim_start().len());
        return Err(SyntaxError::UnknownTarget {
            name: name.to_string(),
            location: index.location(value_start),
            span: SourceSpan::new(value_start.into(), value.trim().len()),
        });
    }
    Ok(())
}

/// Returns the text after an opening `---` line.
fn strip_delimiter(text: &str) -> Option<&str> {
    let after = text.strip_prefix("---")?;
    let line_end = after.find('\n').map(|idx| idx + 1).unwrap_or(after.len());
    after[..line_end].trim().is_empty().then(|| &after[line_end..])
}

/// serde_yaml appends its own "at line X column Y"; the error carries our
/// location instead.
fn strip_yaml_position(message: &str) -> String {
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Channel;

    fn split(source: &str) -> SyntaxResult<FrontmatterBlock> {
        split_frontmatter(source, &LineIndex::new(source))
    }

    #[test]
    fn test_no_frontmatter() {
        let block = split("$count! = 0\n").unwrap();
        assert_eq!(block.body_start, 0);
        assert_eq!(block.frontmatter, Frontmatter::default());
    }

    #[test]
    fn test_target_name_and_channels() {
        let source = "---\ntarget: reactjs\nname: Counter\nchannels:\n  - event: reset\n    emit: onReset\n---\n$count! = 0\n";
        let block = split(source).unwrap();
        assert_eq!(block.frontmatter.target, Some(Target::React));
        assert_eq!(block.frontmatter.name.as_deref(), Some("Counter"));
        assert_eq!(
            block.frontmatter.channels,
            vec![Channel {
                event: "reset".into(),
                emit: "onReset".into()
            }]
        );
        assert_eq!(&source[block.body_start..], "$count! = 0\n");
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let block = split("---\ntarget: vue\nauthor: sam\n---\n").unwrap();
        assert_eq!(
            block.frontmatter.extra.get("author"),
            Some(&serde_yaml::Value::String("sam".into()))
        );
    }

    #[test]
    fn test_unclosed_frontmatter() {
        let err = split("---\ntarget: vue\n$x = 1\n").unwrap_err();
        assert!(err.is_frontmatter());
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_invalid_target_is_reported_at_its_value() {
        let err = split("---\nname: X\ntarget: angular\n---\n").unwrap_err();
        assert!(err.is_frontmatter());
        assert!(err.is_unknown_target());
        assert_eq!(err.to_string(), "Unsupported target framework 'angular' (line 3, column 9)");
    }

    #[test]
    fn test_target_names_ignore_case() {
        let block = split("---\ntarget: React\n---\n").unwrap();
        assert_eq!(block.frontmatter.target, Some(Target::React));
        let block = split("---\ntarget: \"Svelte\"\n---\n").unwrap();
        assert_eq!(block.frontmatter.target, Some(Target::Svelte));
        let block = split("---\ntarget: vue # for the docs site\n---\n").unwrap();
        assert_eq!(block.frontmatter.target, Some(Target::Vue));
    }

    #[test]
    fn test_malformed_yaml_points_into_block() {
        let err = split("---\nname: [unclosed\n---\n$x = 1\n").unwrap_err();
        assert!(err.is_frontmatter());
        assert!(err.location().line >= 2);
    }
}
