use std::fmt::Write;

use clinicamr_core::amr::{AmrBody, AmrSentence, evaluate_constant};

/// Render AMR sentences as one Graphviz digraph, a cluster per sentence.
///
/// Variables become boxes labeled with their concept, constants become plain
/// text nodes and a failed parse becomes a single red error node.
#[must_use]
pub fn render_dot(sents: &[&AmrSentence], front_text: Option<&str>) -> String {
    let mut out = String::from("digraph amr {\n");
    if let Some(text) = front_text {
        let _ = writeln!(out, "  label=\"{}\";\n  labelloc=t;", escape(text));
    }
    out.push_str("  node [shape=box, fontname=\"Helvetica\"];\n");
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=10];\n");
    for (six, sent) in sents.iter().enumerate() {
        let _ = writeln!(out, "  subgraph cluster_{six} {{");
        if let Some(snt) = sent.metadata.get("snt") {
            let _ = writeln!(out, "    label=\"{}\";", escape(snt));
        }
        match &sent.body {
            AmrBody::Graph(graph) => {
                for inst in graph.instances() {
                    let _ = writeln!(
                        out,
                        "    \"s{six}.{}\" [label=\"{} / {}\"];",
                        inst.source,
                        escape(&inst.source),
                        escape(&inst.target)
                    );
                }
                let vars = graph.variables();
                for (tix, triple) in graph.edges().enumerate() {
                    let source = format!("s{six}.{}", triple.source);
                    let role = escape(triple.role_name());
                    if vars.contains(triple.target.as_str()) {
                        let _ = writeln!(
                            out,
                            "    \"{source}\" -> \"s{six}.{}\" [label=\"{role}\"];",
                            triple.target
                        );
                    } else {
                        let _ = writeln!(
                            out,
                            "    \"s{six}._{tix}\" [label=\"{}\", shape=plaintext];",
                            escape(&evaluate_constant(&triple.target))
                        );
                        let _ = writeln!(out, "    \"{source}\" -> \"s{six}._{tix}\" [label=\"{role}\"];");
                    }
                }
            }
            AmrBody::Failure(failure) => {
                let _ = writeln!(
                    out,
                    "    \"s{six}.error\" [label=\"parse error: {}\", color=red];",
                    escape(&failure.message)
                );
            }
        }
        out.push_str("  }\n");
    }
    out.push_str("}\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
