use flo_model::Component;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Clearing,
    Writing { rows: usize },
    Committing,
    Emitting,
    Done,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Parsing => "parsing",
            Stage::Clearing => "clearing",
            Stage::Writing { .. } => "writing",
            Stage::Committing => "committing",
            Stage::Emitting => "emitting",
            Stage::Done => "done",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub component: Option<Component>,
    pub stage: Stage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn stage(component: Option<Component>, stage: Stage, elapsed_wall_s: f64) -> Self {
        Self {
            component,
            stage,
            elapsed_wall_s,
            message: None,
        }
    }
}
