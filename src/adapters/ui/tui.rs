//! Implements InputPort. Inquire-based interactive menus over the directory and assistants.

use crate::adapters::export::roster_to_csv;
use crate::domain::{
    AgentStatus, DomainError, GroupFilter, MemberRole, NewWorkGroup, StudentProfile, WorkGroup,
    WorkGroupInvitation,
};
use crate::ports::InputPort;
use crate::usecases::{AssistantService, DirectoryService};
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Applies the prompt theme for every inquire prompt in the process.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("?").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(Color::LightYellow))
        .with_answered_prompt_prefix(Styled::new("✔").with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

/// Menu entry: a value plus the label shown for it.
struct Choice<T> {
    value: T,
    label: String,
}

impl<T> Choice<T> {
    fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Clone, Copy)]
enum MenuAction {
    Browse,
    MyGroups,
    Create,
    Join,
    Leave,
    Invite,
    Invitations,
    Stats,
    Export,
    Assistants,
    Quit,
}

fn ui_err(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

/// Esc / Ctrl-C inside a sub-menu means "go back".
fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Answer of a sub-flow prompt. `None` when the user backed out.
fn answered<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(ui_err(e)),
    }
}

fn group_line(g: &WorkGroup) -> String {
    let subject = g.subject.as_deref().unwrap_or("-");
    let state = if g.is_active { "" } else { " [inactive]" };
    format!(
        "{} {} ({}, {} gr.{}) {}/{}{}",
        g.id, g.name, subject, g.class_name, g.grade, g.current_members, g.max_members, state
    )
}

fn agent_status_icon(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Available => "[ok]",
        AgentStatus::Busy => "[busy]",
        AgentStatus::Restricted => "[locked]",
        AgentStatus::Offline => "[off]",
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    directory: Arc<DirectoryService>,
    assistant: Arc<AssistantService>,
    student_id: Option<String>,
    export_dir: PathBuf,
}

impl TuiInputPort {
    pub fn new(
        directory: Arc<DirectoryService>,
        assistant: Arc<AssistantService>,
        student_id: Option<String>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            directory,
            assistant,
            student_id,
            export_dir,
        }
    }

    async fn pick_student(&self) -> Result<StudentProfile, DomainError> {
        if let Some(id) = &self.student_id {
            if let Some(student) = self.directory.student(id).await {
                return Ok(student);
            }
            println!("Configured student {} not found, pick one instead.", id);
        }
        let options: Vec<Choice<StudentProfile>> = self
            .directory
            .students()
            .await
            .into_iter()
            .map(|s| {
                let label = format!("{} ({}, grade {})", s.name, s.class_name, s.grade);
                Choice::new(s, label)
            })
            .collect();
        if options.is_empty() {
            return Err(DomainError::Ui("no students in the directory".into()));
        }
        let picked = Select::new("Who are you?", options)
            .prompt()
            .map_err(ui_err)?;
        Ok(picked.value)
    }

    async fn browse(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let filters = vec![
            Choice::new(GroupFilter::default(), "All groups"),
            Choice::new(GroupFilter::default().active_only().with_space(), "Open groups"),
            Choice::new(GroupFilter::default().created_by(&me.id), "Created by me"),
            Choice::new(GroupFilter::default().subject("Math"), "Subject: Math"),
            Choice::new(GroupFilter::default().subject("Physics"), "Subject: Physics"),
            Choice::new(GroupFilter::default().subject("Literature"), "Subject: Literature"),
        ];
        let criteria = match Select::new("Filter", filters).prompt() {
            Ok(c) => c.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let lines: Vec<String> = self
            .directory
            .read(|d| {
                d.filter(&criteria)
                    .into_iter()
                    .map(|g| {
                        let eligible = if d.can_join(me, &g.id) { " *" } else { "" };
                        format!("{}{}", group_line(g), eligible)
                    })
                    .collect()
            })
            .await;
        if lines.is_empty() {
            println!("\nNo groups match.\n");
        } else {
            println!();
            for line in lines {
                println!("  {}", line);
            }
            println!("\n  * = you can join\n");
        }
        Ok(())
    }

    async fn my_groups(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let lines: Vec<String> = self
            .directory
            .read(|d| {
                d.groups_for_student(&me.id)
                    .into_iter()
                    .map(|g| {
                        let role = match d.membership(&g.id, &me.id).map(|m| m.role) {
                            Some(MemberRole::Creator) => "creator",
                            _ => "member",
                        };
                        format!("{} - {}", group_line(g), role)
                    })
                    .collect()
            })
            .await;
        if lines.is_empty() {
            println!("\nYou are not in any group yet.\n");
            return Ok(());
        }
        println!();
        for line in lines {
            println!("  {}", line);
        }
        println!();
        Ok(())
    }

    async fn create(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let default_max = self
            .directory
            .read(|d| d.policy().default_max_members)
            .await;
        let name = match Text::new("Group name:").prompt() {
            Ok(s) => s,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let Some(description) = answered(Text::new("Description:").prompt())? else {
            return Ok(());
        };
        let Some(subject) = answered(Text::new("Subject (optional):").prompt())? else {
            return Ok(());
        };
        let max_members = CustomType::<u32>::new("Max members:")
            .with_default(default_max)
            .with_error_message("Please type a whole number")
            .prompt();
        let Some(max_members) = answered(max_members)? else {
            return Ok(());
        };
        let tags = Text::new("Tags (comma separated, optional):").prompt();
        let Some(tags) = answered(tags)? else {
            return Ok(());
        };

        let data = NewWorkGroup {
            name,
            description,
            class_name: me.class_name.clone(),
            grade: me.grade,
            max_members: Some(max_members),
            tags: tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            subject: Some(subject.trim().to_string()).filter(|s| !s.is_empty()),
            ..NewWorkGroup::default()
        };
        match self.directory.create_group(data, &me.id).await {
            Ok(group) => println!("\nCreated {}.\n", group_line(&group)),
            Err(DomainError::Membership(e)) => println!("\nCould not create group: {}\n", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn join(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let options: Vec<Choice<String>> = self
            .directory
            .read(|d| {
                d.groups()
                    .iter()
                    .filter(|g| d.can_join(me, &g.id) && d.membership(&g.id, &me.id).is_none())
                    .map(|g| Choice::new(g.id.clone(), group_line(g)))
                    .collect()
            })
            .await;
        if options.is_empty() {
            println!("\nNo open groups for {} right now.\n", me.class_name);
            return Ok(());
        }
        let picked = match Select::new("Join which group?", options).prompt() {
            Ok(c) => c.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        match self.directory.join_group(&picked, &me.id).await {
            Ok(_) => println!("\nJoined {}.\n", picked),
            Err(DomainError::Membership(e)) => println!("\nCould not join: {}\n", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn leave(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let options: Vec<Choice<String>> = self
            .directory
            .read(|d| {
                d.groups_for_student(&me.id)
                    .into_iter()
                    .filter(|g| g.created_by != me.id)
                    .map(|g| Choice::new(g.id.clone(), group_line(g)))
                    .collect()
            })
            .await;
        if options.is_empty() {
            println!("\nNothing to leave (creators cannot leave their own group).\n");
            return Ok(());
        }
        let picked = match Select::new("Leave which group?", options).prompt() {
            Ok(c) => c.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let sure = Confirm::new("Leaving is permanent. Continue?")
            .with_default(false)
            .prompt();
        if answered(sure)? != Some(true) {
            return Ok(());
        }
        match self.directory.leave_group(&picked, &me.id).await {
            Ok(()) => println!("\nLeft {}.\n", picked),
            Err(DomainError::Membership(e)) => println!("\nCould not leave: {}\n", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn invite(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let groups: Vec<Choice<String>> = self
            .directory
            .read(|d| {
                d.groups_for_student(&me.id)
                    .into_iter()
                    .filter(|g| {
                        d.membership(&g.id, &me.id)
                            .is_some_and(|m| m.permissions.can_invite)
                    })
                    .map(|g| Choice::new(g.id.clone(), group_line(g)))
                    .collect()
            })
            .await;
        if groups.is_empty() {
            println!("\nYou cannot invite to any group.\n");
            return Ok(());
        }
        let group_id = match Select::new("Invite to which group?", groups).prompt() {
            Ok(c) => c.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let classmates: Vec<Choice<String>> = self
            .directory
            .students()
            .await
            .into_iter()
            .filter(|s| s.id != me.id && s.class_name == me.class_name)
            .map(|s| {
                let label = format!("{} ({})", s.name, s.id);
                Choice::new(s.id, label)
            })
            .collect();
        if classmates.is_empty() {
            println!("\nNo classmates to invite.\n");
            return Ok(());
        }
        let Some(invitee) = answered(Select::new("Invite whom?", classmates).prompt())? else {
            return Ok(());
        };
        let invitee = invitee.value;
        let Some(message) = answered(Text::new("Message (optional):").prompt())? else {
            return Ok(());
        };
        let message = Some(message.trim().to_string()).filter(|m| !m.is_empty());
        match self
            .directory
            .invite(&group_id, &me.id, &invitee, message)
            .await
        {
            Ok(inv) => println!(
                "\nInvitation {} sent, expires {}.\n",
                inv.id,
                inv.expires_at.format("%Y-%m-%d %H:%M UTC")
            ),
            Err(DomainError::Membership(e)) => println!("\nCould not invite: {}\n", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn invitations(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let expired = self.directory.expire_invitations().await?;
        if expired > 0 {
            info!(expired, "stale invitations expired");
        }
        let pending: Vec<(WorkGroupInvitation, String)> = self
            .directory
            .read(|d| {
                d.pending_invitations_for(&me.id)
                    .into_iter()
                    .map(|i| {
                        let group = d
                            .group(&i.group_id)
                            .map(|g| g.name.clone())
                            .unwrap_or_else(|| i.group_id.clone());
                        (i.clone(), group)
                    })
                    .collect()
            })
            .await;
        if pending.is_empty() {
            println!("\nNo pending invitations.\n");
            return Ok(());
        }
        let options: Vec<Choice<String>> = pending
            .iter()
            .map(|(inv, group)| {
                let note = inv.message.as_deref().unwrap_or("");
                Choice::new(
                    inv.id.clone(),
                    format!("{} from {} {}", group, inv.invited_by, note),
                )
            })
            .collect();
        let invitation_id = match Select::new("Answer which invitation?", options).prompt() {
            Ok(c) => c.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let accept = Confirm::new("Accept?").with_default(true).prompt();
        let Some(accept) = answered(accept)? else {
            return Ok(());
        };
        let result = if accept {
            self.directory
                .accept_invitation(&invitation_id, &me.id)
                .await
                .map(|m| format!("Joined {}.", m.group_id))
        } else {
            self.directory
                .decline_invitation(&invitation_id, &me.id)
                .await
                .map(|()| "Invitation declined.".to_string())
        };
        match result {
            Ok(msg) => println!("\n{}\n", msg),
            Err(DomainError::Membership(e)) => println!("\nCould not answer: {}\n", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn stats(&self) {
        let stats = self.directory.read(|d| d.stats()).await;
        println!();
        println!(
            "  Groups:              {} ({} active, {} full)",
            stats.total_groups, stats.active_groups, stats.full_groups
        );
        println!("  Active memberships:  {}", stats.active_memberships);
        println!("  Open seats:          {}", stats.open_seats);
        println!("  Pending invitations: {}", stats.pending_invitations);
        println!();
    }

    async fn export(&self) -> Result<(), DomainError> {
        let snap = self.directory.snapshot().await;
        let csv = roster_to_csv(&snap.groups, &snap.members, &snap.students)
            .map_err(|e| DomainError::Export(e.to_string()))?;
        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| DomainError::Export(format!("create export dir: {}", e)))?;
        let path = self.export_dir.join("roster.csv");
        tokio::fs::write(&path, csv)
            .await
            .map_err(|e| DomainError::Export(format!("write roster: {}", e)))?;
        info!(path = %path.display(), "roster exported");
        println!("\nRoster written to {}\n", path.display());
        Ok(())
    }

    async fn assistants(&self, me: &StudentProfile) -> Result<(), DomainError> {
        let ctx = self.directory.assistant_context().await;
        if let Some(notice) = self
            .assistant
            .restriction_notice(me, &ctx.exams, &ctx.homeworks)
        {
            println!("\n  {}\n", notice);
        }
        let options: Vec<Choice<usize>> = self
            .assistant
            .agent_statuses(&ctx.agents, me, None, &ctx.exams, &ctx.homeworks)
            .into_iter()
            .enumerate()
            .map(|(i, (agent, status))| {
                Choice::new(
                    i,
                    format!("{} {} ({})", agent_status_icon(status), agent.name, status),
                )
            })
            .collect();
        if options.is_empty() {
            println!("\nNo assistants configured.\n");
            return Ok(());
        }
        let idx = match Select::new("Talk to which assistant?", options).prompt() {
            Ok(c) => c.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let agent = &ctx.agents[idx];
        let mut conversation = self.assistant.start_conversation(agent, me, None);
        println!("(empty line to finish)");
        loop {
            let prompt = match Text::new("You:").prompt() {
                Ok(p) => p,
                Err(e) if is_cancel(&e) => break,
                Err(e) => return Err(ui_err(e)),
            };
            if prompt.trim().is_empty() {
                break;
            }
            match self
                .assistant
                .ask(&mut conversation, agent, me, &prompt, &ctx.exams, &ctx.homeworks)
                .await
            {
                Ok(reply) => println!("{}: {}", agent.name, reply),
                Err(DomainError::AssistantUnavailable {
                    status, message, ..
                }) => {
                    println!("{} is {}. {}", agent.name, status, message.unwrap_or_default());
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        if !conversation.messages.is_empty() {
            self.directory.save_conversation(conversation).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let me = self.pick_student().await?;
        info!(student_id = %me.id, "session started");
        println!("\nHi {}! ({} grade {})\n", me.name, me.class_name, me.grade);

        loop {
            let menu = vec![
                Choice::new(MenuAction::Browse, "Browse groups"),
                Choice::new(MenuAction::MyGroups, "My groups"),
                Choice::new(MenuAction::Create, "Create a group"),
                Choice::new(MenuAction::Join, "Join a group"),
                Choice::new(MenuAction::Leave, "Leave a group"),
                Choice::new(MenuAction::Invite, "Invite a classmate"),
                Choice::new(MenuAction::Invitations, "My invitations"),
                Choice::new(MenuAction::Stats, "Directory stats"),
                Choice::new(MenuAction::Export, "Export roster (CSV)"),
                Choice::new(MenuAction::Assistants, "AI assistants"),
                Choice::new(MenuAction::Quit, "Quit"),
            ];
            let action = match Select::new("Main menu", menu).prompt() {
                Ok(c) => c.value,
                Err(e) if is_cancel(&e) => MenuAction::Quit,
                Err(e) => return Err(ui_err(e)),
            };
            match action {
                MenuAction::Browse => self.browse(&me).await?,
                MenuAction::MyGroups => self.my_groups(&me).await?,
                MenuAction::Create => self.create(&me).await?,
                MenuAction::Join => self.join(&me).await?,
                MenuAction::Leave => self.leave(&me).await?,
                MenuAction::Invite => self.invite(&me).await?,
                MenuAction::Invitations => self.invitations(&me).await?,
                MenuAction::Stats => self.stats().await,
                MenuAction::Export => self.export().await?,
                MenuAction::Assistants => self.assistants(&me).await?,
                MenuAction::Quit => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::fixtures::seed_snapshot;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_group_line() {
        let snap = seed_snapshot(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap());
        assert_eq!(
            group_line(&snap.groups[0]),
            "wg-1 Algebra Study Circle (Math, 10-A gr.10) 4/6"
        );
        assert!(group_line(&snap.groups[3]).ends_with("[inactive]"));
    }

    #[test]
    fn test_cancelled_prompt_is_not_an_error() {
        let esc: Result<String, InquireError> = Err(InquireError::OperationCanceled);
        assert_eq!(answered(esc).unwrap(), None);
        let ok: Result<String, InquireError> = Ok("hi".into());
        assert_eq!(answered(ok).unwrap(), Some("hi".to_string()));
        let broken: Result<String, InquireError> = Err(InquireError::NotTTY);
        assert!(matches!(answered(broken), Err(DomainError::Ui(_))));
    }

    #[test]
    fn test_choice_displays_label() {
        let c = Choice::new(7usize, "seven");
        assert_eq!(c.to_string(), "seven");
    }
}
