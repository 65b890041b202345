use crate::domain::project::Project;
use crate::error::Result;
use std::io::Write;

/// Writes final project states as CSV:
/// `id,client,contractor,custody,status,proof` with status as its integer
/// code.
pub struct ProjectWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ProjectWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_projects(&mut self, projects: Vec<Project>) -> Result<()> {
        self.writer
            .write_record(["id", "client", "contractor", "custody", "status", "proof"])?;
        for project in projects {
            self.writer.write_record([
                project.id.to_string(),
                project.client.to_string(),
                project.contractor.to_string(),
                project.total_budget.to_string(),
                project.status.code().to_string(),
                project.proof.unwrap_or_default(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
