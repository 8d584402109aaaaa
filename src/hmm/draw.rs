//!
//! Drawing the state graph of HMM in dot format
//!
use super::Hmm;
use crate::opdf::Opdf;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};

impl<D: Opdf> Hmm<D> {
    ///
    /// State graph of HMM
    ///
    /// * node: state, labelled with `pi` and the opdf
    /// * edge: transition with non-zero probability, labelled with it
    ///
    pub fn to_graph(&self) -> DiGraph<String, String> {
        let mut g = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.n_states())
            .map(|i| {
                g.add_node(format!(
                    "{}: pi={:.2} {}",
                    i,
                    self.pi_value(i),
                    self.opdf(i)
                ))
            })
            .collect();
        for i in 0..self.n_states() {
            for j in 0..self.n_states() {
                if !self.a(i, j).is_zero() {
                    g.add_edge(nodes[i], nodes[j], format!("{:.2}", self.a_value(i, j)));
                }
            }
        }
        g
    }
    ///
    /// Graphviz dot string of the state graph
    ///
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.to_graph(), &[]))
    }
}
