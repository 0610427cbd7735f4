//! PENMAN notation codec.
//!
//! Decoding produces triples in depth-first order: a node's instance triple,
//! then each of its edges, with a nested node's triples following the edge
//! that introduces it. Alignment markers (`~e.3`) are dropped.

use std::collections::HashSet;

use super::graph::{AmrGraph, INSTANCE_ROLE, Triple};
use crate::error::{ClinicalAmrError, Result};

pub fn decode(text: &str) -> Result<AmrGraph> {
    let mut decoder = Decoder { src: text, pos: 0 };
    let mut triples = Vec::new();
    decoder.skip_ws();
    let top = decoder.node(&mut triples)?;
    decoder.skip_ws();
    if decoder.pos < decoder.src.len() {
        return Err(decoder.error("trailing characters after graph"));
    }
    Ok(AmrGraph::new(top, triples))
}

pub fn encode(graph: &AmrGraph) -> String {
    let vars = graph.variables();
    let mut visited = HashSet::new();
    let mut out = String::new();
    if graph.top.is_empty() {
        return out;
    }
    write_node(graph, &graph.top, 0, &vars, &mut visited, &mut out);
    out
}

fn write_node<'a>(
    graph: &'a AmrGraph,
    var: &'a str,
    col: usize,
    vars: &HashSet<&str>,
    visited: &mut HashSet<&'a str>,
    out: &mut String,
) {
    visited.insert(var);
    out.push('(');
    out.push_str(var);
    if let Some(concept) = graph.concept(var) {
        out.push_str(" / ");
        out.push_str(concept);
    }
    let child_col = col + var.chars().count() + 2;
    for triple in graph.edges().filter(|t| t.source == var) {
        out.push('\n');
        out.extend(std::iter::repeat_n(' ', child_col));
        out.push_str(&triple.role);
        out.push(' ');
        let target = triple.target.as_str();
        if vars.contains(target) && !visited.contains(target) {
            let target_col = child_col + triple.role.chars().count() + 1;
            write_node(graph, target, target_col, vars, visited, out);
        } else {
            out.push_str(target);
        }
    }
    out.push(')');
}

struct Decoder<'a> {
    src: &'a str,
    pos: usize,
}

impl Decoder<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: &str) -> ClinicalAmrError {
        ClinicalAmrError::Penman {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(&format!("expected '{want}' but found '{c}'"))),
            None => Err(self.error(&format!("expected '{want}' but found end of input"))),
        }
    }

    fn node(&mut self, triples: &mut Vec<Triple>) -> Result<String> {
        self.expect('(')?;
        self.skip_ws();
        let var = self.symbol();
        if var.is_empty() {
            return Err(self.error("missing node variable"));
        }
        self.skip_ws();
        if self.peek() == Some('/') {
            self.bump();
            self.skip_ws();
            let concept = self.atom()?;
            triples.push(Triple::new(var.clone(), INSTANCE_ROLE, concept));
        }
        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    return Ok(var);
                }
                Some(':') => {
                    let role = self.symbol();
                    self.skip_ws();
                    if self.peek() == Some('(') {
                        let edge = triples.len();
                        triples.push(Triple::new(var.clone(), role, String::new()));
                        let child = self.node(triples)?;
                        triples[edge].target = child;
                    } else {
                        let target = self.atom()?;
                        triples.push(Triple::new(var.clone(), role, target));
                    }
                }
                Some(c) => return Err(self.error(&format!("unexpected '{c}' in node {var}"))),
                None => return Err(self.error(&format!("unterminated node {var}"))),
            }
        }
    }

    fn atom(&mut self) -> Result<String> {
        let atom = if self.peek() == Some('"') {
            self.string()?
        } else {
            self.symbol()
        };
        if atom.is_empty() {
            return Err(self.error("missing atom"));
        }
        self.alignment();
        Ok(atom)
    }

    fn symbol(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '~' | '"') {
                break;
            }
            self.bump();
        }
        let symbol = self.src[start..self.pos].to_string();
        self.alignment();
        symbol
    }

    fn string(&mut self) -> Result<String> {
        let start = self.pos;
        self.expect('"')?;
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('"') => break,
                Some(_) => {}
                None => return Err(self.error("unterminated string")),
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn alignment(&mut self) {
        if self.peek() != Some('~') {
            return;
        }
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')') {
                break;
            }
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WANT: &str = "(w / want-01
   :ARG0 (b / boy)
   :ARG1 (g / go-02
            :ARG0 b))";

    #[test]
    fn decode_depth_first_order() {
        let graph = decode(WANT).unwrap();
        assert_eq!(graph.top, "w");
        let roles: Vec<(&str, &str, &str)> = graph
            .triples
            .iter()
            .map(|t| (t.source.as_str(), t.role.as_str(), t.target.as_str()))
            .collect();
        assert_eq!(
            roles,
            vec![
                ("w", ":instance", "want-01"),
                ("w", ":ARG0", "b"),
                ("b", ":instance", "boy"),
                ("w", ":ARG1", "g"),
                ("g", ":instance", "go-02"),
                ("g", ":ARG0", "b"),
            ]
        );
    }

    #[test]
    fn encode_matches_input_layout() {
        let graph = decode(WANT).unwrap();
        assert_eq!(encode(&graph), WANT);
    }

    #[test]
    fn strings_and_alignments() {
        let graph =
            decode("(p / person~e.1 :name (n / name :op1 \"John\"~e.0 :op2 \"O'Neil\"))").unwrap();
        assert_eq!(graph.concept("p"), Some("person"));
        assert!(graph.triples.contains(&Triple::new("n", ":op1", "\"John\"")));
        assert!(graph.triples.contains(&Triple::new("n", ":op2", "\"O'Neil\"")));
    }

    #[test]
    fn unterminated_node_is_an_error() {
        let err = decode("(d / die-01 :ARG1 (h / he)").unwrap_err();
        assert!(matches!(err, ClinicalAmrError::Penman { .. }));
    }

    #[test]
    fn appended_attribute_nests_under_source() {
        let mut graph = decode("(d / die-01\n   :ARG1 (h / he))").unwrap();
        graph.triples.push(Triple::new("h", ":cui", "C0000001"));
        assert_eq!(
            encode(&graph),
            "(d / die-01\n   :ARG1 (h / he\n            :cui C0000001))"
        );
    }
}
