#![allow(missing_docs)]

use std::fmt::Display;

use itertools::Itertools;

use crate::{
    automaton::StateIndex,
    math::{InsertionOrderedMap, Set},
    transition_system::{Deterministic, Product, ProductIndex},
    Dfa,
};

/// Turns a name into a DOT identifier. Names that are plain alphanumeric words are kept as they
/// are, everything else is quoted with inner quotes and backslashes escaped.
fn quote_dot_ident(name: &str) -> String {
    if !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
    {
        return name.to_string();
    }
    format!("\"{}\"", escape(name))
}

fn escape(text: &str) -> String {
    text.chars()
        .flat_map(|chr| match chr {
            '"' | '\\' => vec!['\\', chr],
            c => vec![c],
        })
        .collect()
}

/// Something that can be written in the DOT format of graphviz. Only the states returned by
/// [`Dottable::dot_state_indices`] are drawn, edges are drawn between them and all symbols leading
/// from one state to the same target are merged into one edge with a combined label.
pub trait Dottable: Deterministic + Sized {
    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        let indices = self.dot_state_indices();

        // the invisible node from which the arrow to the initial state starts
        let idents: Set<String> = indices
            .iter()
            .chain(std::iter::once(&self.initial()))
            .map(|q| self.dot_state_ident(*q))
            .collect();
        let mut entry = String::from("__start");
        while idents.contains(&entry) {
            entry.push('_');
        }

        let header = [
            format!("digraph {} {{", quote_dot_ident(&self.dot_name())),
            "rankdir=LR".to_string(),
            format!("{entry} [label=\"\", shape=none, width=0, height=0]"),
        ]
        .into_iter()
        .chain(self.dot_header_statements());

        let states = indices
            .iter()
            .map(|q| {
                format!(
                    "{} [{}]",
                    quote_dot_ident(&self.dot_state_ident(*q)),
                    self.dot_state_attributes(*q)
                        .into_iter()
                        .map(|attr| attr.to_string())
                        .join(", ")
                )
            })
            .collect_vec();

        let init = format!(
            "{entry} -> {}",
            quote_dot_ident(&self.dot_state_ident(self.initial()))
        );

        let transitions = indices.iter().flat_map(|q| {
            let mut grouped: InsertionOrderedMap<Self::StateIndex, Vec<char>> =
                InsertionOrderedMap::default();
            for sym in self.alphabet().universe() {
                if let Some(p) = self.successor(*q, sym) {
                    grouped.entry(p).or_default().push(sym);
                }
            }
            grouped.into_iter().map(move |(p, symbols)| {
                format!(
                    "{} -> {} [{}]",
                    quote_dot_ident(&self.dot_state_ident(*q)),
                    quote_dot_ident(&self.dot_state_ident(p)),
                    DotTransitionAttribute::Label(symbols.iter().join(", "))
                )
            })
        });

        header
            .chain(states)
            .chain(std::iter::once(init))
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }

    /// Additional statements placed right after the opening line of the graph.
    fn dot_header_statements(&self) -> impl IntoIterator<Item = String> {
        []
    }

    /// The states that should be drawn. Defaults to all reachable states in breadth-first order.
    fn dot_state_indices(&self) -> Vec<Self::StateIndex> {
        self.reachable_state_indices().collect()
    }

    fn dot_name(&self) -> String;

    fn dot_state_ident(&self, idx: Self::StateIndex) -> String;

    fn dot_state_attributes(&self, idx: Self::StateIndex) -> impl IntoIterator<Item = DotStateAttribute> {
        [DotStateAttribute::Label(self.dot_state_ident(idx))]
    }
}

impl Dottable for Dfa {
    fn dot_name(&self) -> String {
        "DFA".into()
    }

    /// All declared states, including unreachable ones.
    fn dot_state_indices(&self) -> Vec<StateIndex> {
        self.state_indices().collect()
    }

    fn dot_state_ident(&self, idx: StateIndex) -> String {
        self.state_name(idx)
            .map_or_else(|| format!("q{idx}"), str::to_string)
    }

    fn dot_state_attributes(&self, idx: StateIndex) -> impl IntoIterator<Item = DotStateAttribute> {
        let shape = if self.is_accepting(idx) {
            "doublecircle"
        } else {
            "circle"
        };
        vec![
            DotStateAttribute::Shape(shape.into()),
            DotStateAttribute::Label(self.dot_state_ident(idx)),
        ]
    }
}

impl Dottable for Product<'_> {
    fn dot_name(&self) -> String {
        "Product".into()
    }

    fn dot_state_ident(&self, idx: ProductIndex) -> String {
        self.state_name(idx)
    }

    /// Pairs on which the two components disagree are highlighted.
    fn dot_state_attributes(&self, idx: ProductIndex) -> impl IntoIterator<Item = DotStateAttribute> {
        let mut attributes = vec![
            DotStateAttribute::Shape("box".into()),
            DotStateAttribute::Label(self.dot_state_ident(idx)),
        ];
        if self.disagrees(idx) {
            attributes.push(DotStateAttribute::Color("red".into()));
        }
        attributes
    }
}

/// Enum that abstracts attributes in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
    /// The color of a node
    Color(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{}\"", escape(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape=\"{}\"", s),
            DotStateAttribute::Color(c) => write!(f, "color=\"{}\"", c),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label=\"{}\"", escape(lbl)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::quote_dot_ident;
    use crate::prelude::*;
    use crate::tests::{binary_dfa, odd_ones};

    #[test]
    fn identifiers() {
        assert_eq!(quote_dot_ident("q0"), "q0");
        assert_eq!(quote_dot_ident("0"), "\"0\"");
        assert_eq!(quote_dot_ident("(q0, ∅)"), "\"(q0, ∅)\"");
        assert_eq!(quote_dot_ident("a\"b"), "\"a\\\"b\"");
    }

    #[test_log::test]
    fn dfa_representation() {
        let dot = odd_ones().dot_representation();
        assert!(dot.starts_with("digraph DFA {"));
        assert!(dot.ends_with('}'));
        assert!(dot.contains("q1 [shape=\"doublecircle\", label=\"q1\"]"));
        assert!(dot.contains("q0 [shape=\"circle\", label=\"q0\"]"));
        assert!(dot.contains("__start -> q0"));
        assert!(dot.contains("q0 -> q1 [label=\"1\"]"));
    }

    #[test]
    fn entry_node_is_distinct_from_states() {
        let dfa = binary_dfa(
            &["init", "__start"],
            &["__start"],
            &[
                ("init", '0', "__start"),
                ("init", '1', "init"),
                ("__start", '0', "__start"),
                ("__start", '1', "init"),
            ],
        );
        let dot = dfa.dot_representation();
        assert!(dot.contains("__start_ [label=\"\", shape=none, width=0, height=0]"));
        assert!(dot.contains("__start_ -> init\n"));
        assert!(dot.contains("init [shape=\"circle\", label=\"init\"]"));
        assert!(dot.contains("init -> init [label=\"1\"]"));
        assert!(!dot.contains("init -> init\n"));
        assert_eq!(dot.matches("shape=none").count(), 1);
    }

    #[test]
    fn merged_edge_labels() {
        let dfa = binary_dfa(
            &["s", "t"],
            &["t"],
            &[("s", '0', "t"), ("s", '1', "t"), ("t", '0', "t"), ("t", '1', "t")],
        );
        let dot = dfa.dot_representation();
        assert!(dot.contains("s -> t [label=\"0, 1\"]"));
        assert_eq!(dot.matches("s -> t").count(), 1);
    }

    #[test]
    fn unreachable_states_are_drawn() {
        let dfa = binary_dfa(
            &["s", "lost"],
            &[],
            &[("s", '0', "s"), ("s", '1', "s"), ("lost", '0', "s"), ("lost", '1', "s")],
        );
        assert!(dfa.dot_representation().contains("lost [shape=\"circle\""));
    }

    #[test]
    fn product_highlights_disagreement() {
        let left = odd_ones();
        let right = binary_dfa(
            &["a", "b"],
            &["b"],
            &[("a", '0', "b"), ("a", '1', "a"), ("b", '0', "b"), ("b", '1', "b")],
        );
        let product = Product::new(&left, &right);
        let dot = product.dot_representation();
        assert!(dot.starts_with("digraph Product {"));
        assert!(dot.contains("\"(q0, a)\" [shape=\"box\", label=\"(q0, a)\"]"));
        assert!(dot.contains("\"(q0, b)\" [shape=\"box\", label=\"(q0, b)\", color=\"red\"]"));
    }
}
