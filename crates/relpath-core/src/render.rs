//! String encodings of a path.
//!
//! The default form prefixes each label with a direction glyph
//! (`>nsubj <dobj`). The dependency form concatenates the labels alone. The
//! multi-variant form also names the edge that enters the peak of the path,
//! branching once per alternative when remote edges give the peak several
//! incoming labels.

use crate::config::RenderConfig;
use crate::graph::{DepGraph, Direction, Step};

/// Space-joined `{glyph}{label}` with `>` for down steps and `<` for up steps.
pub fn default_representation(steps: &[Step]) -> String {
    PathRenderer::default().default_representation(steps)
}

/// Labels concatenated without separators.
pub fn dependency_representation(steps: &[Step]) -> String {
    steps.iter().map(|step| step.label.as_str()).collect()
}

/// Cross-product join of two variant lists, `left` varying slowest.
pub fn join_segments(left: &[String], right: &[String], separator: &str) -> Vec<String> {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| format!("{l}{separator}{r}")))
        .collect()
}

fn push_piece(target: &mut String, piece: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(piece);
}

/// Renders steps with configurable glyphs and peak marking.
#[derive(Debug, Clone, Default)]
pub struct PathRenderer {
    config: RenderConfig,
}

impl PathRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn glyph(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.config.up_glyph,
            Direction::Down => &self.config.down_glyph,
        }
    }

    fn piece(&self, step: &Step) -> String {
        format!("{}{}", self.glyph(step.direction), step.label)
    }

    pub fn default_representation(&self, steps: &[Step]) -> String {
        let mut rendered = String::new();
        for step in steps {
            push_piece(&mut rendered, &self.piece(step));
        }
        rendered
    }

    /// Labels entering the peak node, or the root label when it has none.
    fn peak_labels<'a>(&'a self, graph: &'a DepGraph, peak: &str) -> Vec<&'a str> {
        let labels = graph.incoming_labels(peak);
        if labels.is_empty() {
            vec![self.config.root_label.as_str()]
        } else {
            labels
        }
    }

    /// Every rendering of `steps`.
    ///
    /// With peak marking on, each up step followed by a down step inserts the
    /// incoming label of the node between them. A peak with `n` incoming
    /// labels multiplies the variant count by `n`; variants for the first
    /// alternative come first. Without peaks the single variant equals
    /// [`PathRenderer::default_representation`].
    pub fn variants(&self, steps: &[Step], graph: &DepGraph) -> Vec<String> {
        let mut variants = vec![String::new()];
        let mut previous: Option<Direction> = None;

        for step in steps {
            if self.config.mark_peak
                && previous == Some(Direction::Up)
                && step.direction == Direction::Down
            {
                let labels = self.peak_labels(graph, &step.from);
                variants = labels
                    .iter()
                    .flat_map(|label| {
                        variants.iter().map(move |variant| {
                            let mut branched = variant.clone();
                            push_piece(&mut branched, label);
                            branched
                        })
                    })
                    .collect();
            }

            let piece = self.piece(step);
            for variant in &mut variants {
                push_piece(variant, &piece);
            }
            previous = Some(step.direction);
        }
        variants
    }

    /// [`join_segments`] with the configured separator.
    pub fn join(&self, left: &[String], right: &[String]) -> Vec<String> {
        join_segments(left, right, &self.config.segment_separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Link;

    fn step(from: &str, to: &str, direction: Direction, label: &str) -> Step {
        Step {
            from: from.to_string(),
            to: to.to_string(),
            direction,
            label: label.to_string(),
        }
    }

    fn passage() -> DepGraph {
        DepGraph::new(vec![
            Link::new("1.2", "1.1", "H"),
            Link::new("1.3", "1.1", "H"),
            Link::new("0.1", "1.2", "A"),
            Link::new("0.2", "1.2", "P"),
            Link::new("0.3", "1.3", "A"),
            Link::new("0.4", "1.3", "P"),
        ])
    }

    #[test]
    fn test_default_representation() {
        let steps = vec![
            step("a", "b", Direction::Down, "nsubj"),
            step("b", "c", Direction::Down, "dobj"),
        ];
        assert_eq!(default_representation(&steps), ">nsubj >dobj");
        assert_eq!(dependency_representation(&steps), "nsubjdobj");
        assert_eq!(default_representation(&[]), "");
    }

    #[test]
    fn test_custom_glyphs() {
        let renderer = PathRenderer::new(RenderConfig {
            up_glyph: "!".to_string(),
            down_glyph: "^".to_string(),
            ..RenderConfig::default()
        });
        let steps = vec![
            step("a", "b", Direction::Up, "A"),
            step("b", "c", Direction::Down, "P"),
        ];
        assert_eq!(renderer.default_representation(&steps), "!A ^P");
    }

    #[test]
    fn test_variants_mark_root_peak() {
        let graph = passage();
        let steps = graph.undirected_steps("0.1", "0.4").unwrap();
        let renderer = PathRenderer::default();
        assert_eq!(
            renderer.variants(&steps, &graph),
            vec!["<A <H 0 >H >P"]
        );
    }

    #[test]
    fn test_variants_without_peak_marking() {
        let graph = passage();
        let steps = graph.undirected_steps("0.1", "0.4").unwrap();
        let renderer = PathRenderer::new(RenderConfig {
            mark_peak: false,
            ..RenderConfig::default()
        });
        assert_eq!(
            renderer.variants(&steps, &graph),
            vec![renderer.default_representation(&steps)]
        );
    }

    #[test]
    fn test_variants_branch_on_remote_labels() {
        let graph = DepGraph::new(vec![
            Link::new("1.3", "1.1", "H"),
            Link::new("1.4", "1.1", "H"),
            Link::new("1.3", "1.4", "E"),
            Link::new("0.3", "1.3", "A"),
            Link::new("0.4", "1.3", "P"),
        ]);
        let steps = graph.undirected_steps("0.3", "0.4").unwrap();
        assert_eq!(
            PathRenderer::default().variants(&steps, &graph),
            vec!["<A H >P", "<A E >P"]
        );
    }

    #[test]
    fn test_variants_multiply_across_peaks() {
        let graph = DepGraph::new(vec![
            Link::new("p", "r", "P1"),
            Link::new("p", "s", "P2"),
            Link::new("q", "r", "Q1"),
            Link::new("q", "s", "Q2"),
        ]);
        let steps = vec![
            step("x", "p", Direction::Up, "a"),
            step("p", "y", Direction::Down, "b"),
            step("y", "q", Direction::Up, "c"),
            step("q", "z", Direction::Down, "d"),
        ];
        assert_eq!(
            PathRenderer::default().variants(&steps, &graph),
            vec![
                "<a P1 >b <c Q1 >d",
                "<a P2 >b <c Q1 >d",
                "<a P1 >b <c Q2 >d",
                "<a P2 >b <c Q2 >d",
            ]
        );
    }

    #[test]
    fn test_variants_of_empty_path() {
        let graph = passage();
        assert_eq!(PathRenderer::default().variants(&[], &graph), vec![""]);
    }

    #[test]
    fn test_join_segments() {
        let left = vec!["<A".to_string(), "<D".to_string()];
        let right = vec![">P".to_string()];
        assert_eq!(
            join_segments(&left, &right, " >< "),
            vec!["<A >< >P", "<D >< >P"]
        );
        assert_eq!(PathRenderer::default().join(&left, &right)[1], "<D >< >P");
        assert!(join_segments(&left, &[], " >< ").is_empty());
    }
}
