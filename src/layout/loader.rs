//! Text format for graph prototypes.
//!
//! One record per line, fields separated by whitespace. Names are
//! double-quoted when they contain spaces (`\"` and `\\` escape inside
//! quotes). A token starting with `#` comments out the rest of the line.
//!
//! ```text
//! # canvas <w> <h>
//! canvas 1200 1200
//! # proto <id> "<name>" <w> <h> <inputs> <outputs>
//! proto 0 "Add" 120 60 2 1
//! # node <id> <proto> "<name>"
//! node 0 0 "a"
//! node 1 0 ""
//! # link <out_node> <out_port> <in_node> <in_port>
//! link 0 0 1 1
//! ```
//!
//! Prototype and node ids must count up from 0 in file order. Inputs are
//! placed on the left side of the box and outputs on the right side.
//! Loading is all-or-nothing: the first malformed record aborts it.

use super::prototype::{GraphError, GraphPrototype, Link, NodePrototype};
use crate::geometry::Vec2;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Failure to load a prototype description.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: unknown record `{keyword}`")]
    UnknownRecord { line: usize, keyword: String },

    #[error("line {line}: `{keyword}` record is missing its {field}")]
    MissingField {
        line: usize,
        keyword: &'static str,
        field: &'static str,
    },

    #[error("line {line}: invalid {field} `{value}`")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unexpected token `{token}`")]
    TrailingToken { line: usize, token: String },

    #[error("line {line}: unterminated quoted string")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: {keyword} id {found} out of sequence, expected {expected}")]
    OutOfSequence {
        line: usize,
        keyword: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("line {line}: {source}")]
    Graph {
        line: usize,
        #[source]
        source: GraphError,
    },
}

/// Splits a line into tokens, honoring quotes and `#` comments.
fn tokenize(text: &str, line: usize) -> Result<Vec<String>, LoadError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '#' {
            break;
        }
        if c == '"' {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => return Err(LoadError::UnterminatedQuote { line }),
                    },
                    Some(other) => token.push(other),
                    None => return Err(LoadError::UnterminatedQuote { line }),
                }
            }
            tokens.push(token);
            continue;
        }
        let mut token = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            token.push(c);
            chars.next();
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Field cursor over the tokens of one record.
struct Record<'a> {
    line: usize,
    keyword: &'static str,
    fields: std::slice::Iter<'a, String>,
}

impl<'a> Record<'a> {
    fn next_str(&mut self, field: &'static str) -> Result<&'a str, LoadError> {
        self.fields
            .next()
            .map(String::as_str)
            .ok_or(LoadError::MissingField {
                line: self.line,
                keyword: self.keyword,
                field,
            })
    }

    fn next<T: FromStr>(&mut self, field: &'static str) -> Result<T, LoadError> {
        let raw = self.next_str(field)?;
        raw.parse().map_err(|_| LoadError::InvalidValue {
            line: self.line,
            field,
            value: raw.to_string(),
        })
    }

    fn next_extent(&mut self, field: &'static str) -> Result<f64, LoadError> {
        let line = self.line;
        let value: f64 = self.next(field)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(LoadError::InvalidValue {
                line,
                field,
                value: value.to_string(),
            })
        }
    }

    fn finish(mut self) -> Result<(), LoadError> {
        match self.fields.next() {
            Some(token) => Err(LoadError::TrailingToken {
                line: self.line,
                token: token.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn sequential(line: usize, keyword: &'static str, found: usize, expected: usize) -> Result<(), LoadError> {
    if found == expected {
        Ok(())
    } else {
        Err(LoadError::OutOfSequence {
            line,
            keyword,
            found,
            expected,
        })
    }
}

/// Parses a prototype description.
pub fn parse_prototype(text: &str) -> Result<GraphPrototype, LoadError> {
    let mut graph = GraphPrototype::default();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let tokens = tokenize(raw, line)?;
        let Some((keyword, rest)) = tokens.split_first() else {
            continue;
        };
        let graph_err = |source| LoadError::Graph { line, source };

        match keyword.as_str() {
            "canvas" => {
                let mut r = Record {
                    line,
                    keyword: "canvas",
                    fields: rest.iter(),
                };
                let w = r.next_extent("width")?;
                let h = r.next_extent("height")?;
                r.finish()?;
                graph.set_canvas(Vec2::new(w, h)).map_err(graph_err)?;
                debug!(line, w, h, "canvas");
            }
            "proto" => {
                let mut r = Record {
                    line,
                    keyword: "proto",
                    fields: rest.iter(),
                };
                let id: usize = r.next("id")?;
                let name = r.next_str("name")?;
                let w = r.next_extent("width")?;
                let h = r.next_extent("height")?;
                let inputs: usize = r.next("input count")?;
                let outputs: usize = r.next("output count")?;
                r.finish()?;
                sequential(line, "proto", id, graph.prototypes().len())?;
                graph
                    .add_prototype(NodePrototype::new(name, Vec2::new(w, h), inputs, outputs))
                    .map_err(graph_err)?;
                debug!(line, id, name, w, h, inputs, outputs, "node prototype");
            }
            "node" => {
                let mut r = Record {
                    line,
                    keyword: "node",
                    fields: rest.iter(),
                };
                let id: usize = r.next("id")?;
                let proto: usize = r.next("prototype")?;
                let name = r.next_str("name")?;
                r.finish()?;
                sequential(line, "node", id, graph.node_count())?;
                graph.add_node(proto, name).map_err(graph_err)?;
                debug!(line, id, proto, name, "node");
            }
            "link" => {
                let mut r = Record {
                    line,
                    keyword: "link",
                    fields: rest.iter(),
                };
                let link = Link::new(
                    r.next("output node")?,
                    r.next("output port")?,
                    r.next("input node")?,
                    r.next("input port")?,
                );
                r.finish()?;
                graph.add_link(link).map_err(graph_err)?;
                debug!(
                    line,
                    "link {}:{} -> {}:{}",
                    link.source_node,
                    link.source_port,
                    link.target_node,
                    link.target_port
                );
            }
            other => {
                return Err(LoadError::UnknownRecord {
                    line,
                    keyword: other.to_string(),
                })
            }
        }
    }

    Ok(graph)
}

/// Reads and parses a prototype description file.
pub fn load_prototype(path: impl AsRef<Path>) -> Result<GraphPrototype, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse_prototype(&text)?;
    info!(
        path = %path.display(),
        prototypes = graph.prototypes().len(),
        nodes = graph.node_count(),
        links = graph.link_count(),
        "graph loaded"
    );
    Ok(graph)
}

impl FromStr for GraphPrototype {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prototype(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# two adders feeding a sink
canvas 800 600
proto 0 "Add" 120 60 2 1
proto 1 "Sink Node" 80 40 1 0   # trailing comment
node 0 0 "a"
node 1 0 ""
node 2 1 "out"
link 0 0 1 1
link 1 0 2 0
"#;

    #[test]
    fn test_parse_sample() {
        let g = parse_prototype(SAMPLE).expect("valid sample");
        assert_eq!(g.canvas(), Vec2::new(800.0, 600.0));
        assert_eq!(g.prototypes().len(), 2);
        assert_eq!(g.prototypes()[1].name, "Sink Node");
        assert_eq!(g.prototypes()[1].out_ports.len(), 0);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node_name(1), "Add");
        assert_eq!(g.node_name(2), "out");
        assert_eq!(g.links(), &[Link::new(0, 0, 1, 1), Link::new(1, 0, 2, 0)]);
    }

    #[test]
    fn test_from_str() {
        let g: GraphPrototype = "proto 0 p 10 10 0 0\nnode 0 0 x".parse().expect("valid");
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_tokenize_quotes_and_escapes() {
        let tokens = tokenize(r#"node 0 0 "a \"b\" c" # rest"#, 1).expect("valid");
        assert_eq!(tokens, vec!["node", "0", "0", r#"a "b" c"#]);
        let tokens = tokenize(r#"node 0 0 """#, 1).expect("valid");
        assert_eq!(tokens[3], "");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_prototype("proto 0 \"open 10 10 1 1").unwrap_err();
        assert!(matches!(err, LoadError::UnterminatedQuote { line: 1 }));
    }

    #[test]
    fn test_unknown_record() {
        let err = parse_prototype("canvas 10 10\nedge 0 0 1 0").unwrap_err();
        match err {
            LoadError::UnknownRecord { line, keyword } => {
                assert_eq!(line, 2);
                assert_eq!(keyword, "edge");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        let err = parse_prototype("proto 0 \"p\" 10").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField {
                line: 1,
                keyword: "proto",
                field: "height"
            }
        ));

        let err = parse_prototype("canvas wide 10").unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { field: "width", .. }));

        let err = parse_prototype("canvas 10 10 10").unwrap_err();
        assert!(matches!(err, LoadError::TrailingToken { .. }));
    }

    #[test]
    fn test_ids_must_be_sequential() {
        let err = parse_prototype("proto 1 p 10 10 0 0").unwrap_err();
        assert!(matches!(
            err,
            LoadError::OutOfSequence {
                keyword: "proto",
                found: 1,
                expected: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_structural_errors_carry_line() {
        let text = "proto 0 p 10 10 1 1\nnode 0 0 a\nlink 0 0 1 0";
        let err = parse_prototype(text).unwrap_err();
        match err {
            LoadError::Graph { line, source } => {
                assert_eq!(line, 3);
                assert_eq!(source, GraphError::UnknownNode { node: 1, count: 1 });
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = parse_prototype("node 0 3 a").unwrap_err();
        assert!(matches!(err, LoadError::Graph { line: 1, .. }));

        let err = parse_prototype("proto 0 p 0 10 1 1").unwrap_err();
        assert!(err.to_string().contains("node size"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_prototype("/nonexistent/graph.ng").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("graph.ng"));
    }
}
