//! Context rendering for the downstream answer generator.

use crate::{GraphData, Selection};

/// Placeholder for nodes without a description.
pub const NO_DEFINITION: &str = "No definition";

fn description_of<'g>(graph: &'g GraphData, id: &str) -> &'g str {
    graph
        .get_node(id)
        .and_then(|n| n.description.as_deref())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DEFINITION)
}

/// Render a selection as an ordered text block.
///
/// Prerequisites come first (most foundational first), then the target's
/// definition, then every remaining context node in discovery order.
/// The prerequisite block is omitted when there are none.
pub fn format_context(graph: &GraphData, selection: &Selection) -> String {
    let target = selection.target.as_str();
    let mut lines: Vec<String> = Vec::new();

    if !selection.prerequisites.is_empty() {
        lines.push(format!(
            "--- PREREQUISITE CONCEPTS (Scaffolding for {target}) ---"
        ));
        for node in &selection.prerequisites {
            lines.push(format!(
                "Concept: {node}\nDetails: {}\n",
                description_of(graph, node)
            ));
        }
    }

    lines.push(format!("--- TARGET CONCEPT: {target} ---"));
    lines.push(format!("Definition: {}\n", description_of(graph, target)));

    lines.push("--- RESOURCES & EXAMPLES ---".to_string());
    for node in &selection.context {
        if node == target || selection.prerequisites.contains(node) {
            continue;
        }
        lines.push(format!(
            "Item: {node}\nInfo: {}",
            description_of(graph, node)
        ));
    }

    lines.join("\n")
}

/// Build the tutoring instruction handed to the answer generator.
pub fn build_tutor_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an expert tutor.\n\
         \n\
         USER QUERY: \"{question}\"\n\
         \n\
         Use the knowledge graph context below to answer.\n\
         \n\
         PEDAGOGICAL INSTRUCTIONS:\n\
         1. Start by briefly reviewing the PREREQUISITE CONCEPTS to scaffold the learning.\n\
         2. Then explain the TARGET CONCEPT in depth.\n\
         3. Use the RESOURCES & EXAMPLES to illustrate.\n\
         4. Finally, mention related concepts (near transfer) to broaden understanding.\n\
         \n\
         CONTEXT SUBGRAPH:\n\
         {context}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{SelectorConfig, select};
    use crate::types::*;

    fn sample_graph() -> GraphData {
        let mut g = GraphData::new(false);
        g.add_node(Node::new("derivative").with_description("Rate of change"));
        g.add_node(Node::new("chain rule").with_description("Derivative of a composition"));
        g.add_node(Node::new("chunk-3"));
        g.add_edge(
            Edge::new("derivative", "chain rule").with_relationship(RelationshipType::Prerequisite),
        )
        .unwrap();
        g.add_edge(Edge::new("chain rule", "chunk-3")).unwrap();
        g
    }

    #[test]
    fn test_format_context_layout() {
        let g = sample_graph();
        let sel = select(&g, "chain rule", &SelectorConfig::default()).unwrap();
        let text = format_context(&g, &sel);

        let expected = "--- PREREQUISITE CONCEPTS (Scaffolding for CHAIN RULE) ---\n\
                        Concept: DERIVATIVE\nDetails: Rate of change\n\n\
                        --- TARGET CONCEPT: CHAIN RULE ---\n\
                        Definition: Derivative of a composition\n\n\
                        --- RESOURCES & EXAMPLES ---\n\
                        Item: CHUNK-3\nInfo: No definition";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_format_context_without_prerequisites() {
        let mut g = GraphData::new(false);
        g.add_node(Node::new("alone"));
        let sel = select(&g, "alone", &SelectorConfig::default()).unwrap();
        let text = format_context(&g, &sel);

        assert!(!text.contains("PREREQUISITE CONCEPTS"));
        assert!(text.starts_with("--- TARGET CONCEPT: ALONE ---\nDefinition: No definition"));
        assert!(text.ends_with("--- RESOURCES & EXAMPLES ---"));
    }

    #[test]
    fn test_format_context_is_deterministic() {
        let g = sample_graph();
        let sel = select(&g, "chain rule", &SelectorConfig::default()).unwrap();
        assert_eq!(format_context(&g, &sel), format_context(&g, &sel));
    }

    #[test]
    fn test_build_tutor_prompt_embeds_inputs() {
        let prompt = build_tutor_prompt("what is the chain rule?", "CTX");
        assert!(prompt.contains("USER QUERY: \"what is the chain rule?\""));
        assert!(prompt.ends_with("CONTEXT SUBGRAPH:\nCTX\n"));
    }
}
