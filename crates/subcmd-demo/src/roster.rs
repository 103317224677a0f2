//! The in-memory roster the demo commands operate on.

use std::path::Path;
use std::sync::Mutex;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub manager: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Roster {
    employees: Mutex<Vec<Employee>>,
}

impl Roster {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            employees: Mutex::new(employees),
        }
    }

    pub fn sample() -> Self {
        let employee = |name: &str, title: &str, manager: bool| Employee {
            name: name.to_string(),
            title: title.to_string(),
            manager,
            tags: Vec::new(),
        };
        Self::new(vec![
            employee("ada", "engineer", false),
            employee("grace", "director", true),
            employee("linus", "engineer", false),
        ])
    }

    /// Loads a YAML list of employees.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading roster {}", path.display()))?;
        let employees: Vec<Employee> = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing roster {}", path.display()))?;
        Ok(Self::new(employees))
    }

    pub fn snapshot(&self) -> Vec<Employee> {
        self.lock().clone()
    }

    pub fn add(&self, employee: Employee) -> anyhow::Result<()> {
        let mut employees = self.lock();
        anyhow::ensure!(
            !employees.iter().any(|e| e.name == employee.name),
            "{} is already on the roster",
            employee.name
        );
        employees.push(employee);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<Employee> {
        self.lock().iter().find(|e| e.name == name).cloned()
    }

    pub fn tag(&self, name: &str, tags: &[String]) -> anyhow::Result<()> {
        let mut employees = self.lock();
        let employee = employees
            .iter_mut()
            .find(|e| e.name == name)
            .with_context(|| format!("no employee named {name}"))?;
        for tag in tags {
            if !employee.tags.contains(tag) {
                employee.tags.push(tag.clone());
            }
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Employee>> {
        // A panic while holding the lock leaves the list itself intact.
        self.employees
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_add_rejects_duplicates() {
        let roster = Roster::sample();
        let err = roster.add(roster.find("ada").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "ada is already on the roster");
    }

    #[test]
    fn test_tag_is_idempotent() {
        let roster = Roster::sample();
        let tags = vec!["oncall".to_string(), "oncall".to_string()];
        roster.tag("ada", &tags).unwrap();
        assert_eq!(roster.find("ada").unwrap().tags, ["oncall"]);
        assert!(roster.tag("nobody", &tags).is_err());
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- name: bob\n  title: intern\n- name: carol\n  manager: true").unwrap();
        let roster = Roster::load(file.path()).unwrap();
        let employees = roster.snapshot();
        assert_eq!(employees.len(), 2);
        assert!(employees[1].manager);
        assert_eq!(employees[0].title, "intern");
    }
}
