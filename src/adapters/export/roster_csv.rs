//! Roster export. Uses the `csv` crate for safe serialization.
//!
//! One row per member row (active and former), grouped in directory order.

use crate::domain::{MemberRole, StudentProfile, WorkGroup, WorkGroupMember};

/// Convert groups and their member rows to a CSV string.
///
/// Format: `Group;Student;Name;Role;Active;Joined` (semicolon-delimited, like the
/// spreadsheet exports teachers already use). Unknown students export with an empty name.
pub fn roster_to_csv(
    groups: &[WorkGroup],
    members: &[WorkGroupMember],
    students: &[StudentProfile],
) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["Group", "Student", "Name", "Role", "Active", "Joined"])?;

    for group in groups {
        for m in members.iter().filter(|m| m.group_id == group.id) {
            let name = students
                .iter()
                .find(|s| s.id == m.student_id)
                .map(|s| s.name.as_str())
                .unwrap_or("");
            let role = match m.role {
                MemberRole::Creator => "creator",
                MemberRole::Member => "member",
            };
            let active = if m.is_active { "yes" } else { "no" };
            let joined = m.joined_at.format("%Y-%m-%d %H:%M").to_string();
            wtr.write_record([
                group.name.as_str(),
                m.student_id.as_str(),
                name,
                role,
                active,
                joined.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::fixtures::seed_snapshot;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_roster_to_csv_basic() {
        let snap = seed_snapshot(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap());
        let csv = roster_to_csv(&snap.groups[..1], &snap.members, &snap.students).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Group;Student;Name;Role;Active;Joined");
        // wg-1 has 4 active rows and one former member
        assert_eq!(lines.len(), 1 + 5);
        assert!(
            lines[1].starts_with("Algebra Study Circle;student-1;Aigerim Sadykova;creator;yes;")
        );
        assert!(csv.contains("student-6;Ruslan Nurpeisov;member;no;"));
    }

    #[test]
    fn test_roster_to_csv_quotes_delimiters() {
        let mut snap = seed_snapshot(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap());
        snap.groups[0].name = "Algebra; advanced".to_string();
        let csv = roster_to_csv(&snap.groups[..1], &snap.members, &[]).unwrap();
        assert!(csv.contains("\"Algebra; advanced\";student-1;;creator;yes;"));
    }
}
