use crate::models::Task;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Selector value for tasks without a list.
pub const UNASSIGNED: &str = "no-list";

/// The user's current list filter choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ListFilter {
    #[default]
    All,
    Unassigned,
    List(Uuid),
}

impl ListFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Unassigned => task.list_id.is_none(),
            ListFilter::List(id) => task.belongs_to(id),
        }
    }
}

impl FromStr for ListFilter {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(ListFilter::All),
            UNASSIGNED => Ok(ListFilter::Unassigned),
            other => Uuid::parse_str(other).map(ListFilter::List),
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListFilter::All => Ok(()),
            ListFilter::Unassigned => f.write_str(UNASSIGNED),
            ListFilter::List(id) => write!(f, "{}", id),
        }
    }
}

/// Tasks visible under `filter`, in their original relative order.
pub fn derive_filtered_view<'a>(tasks: &'a [Task], filter: &ListFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}
