//! Subcommand definitions and their execution against a [`ClubStore`].

use std::num::NonZeroU32;

use anyhow::{Context as _, Result, anyhow};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use club_core::{
  member::{MemberPatch, MemberStatus, NewMember},
  sport::{NewSport, SportPatch},
  store::ClubStore,
};
use club_store_sqlite::SqliteStore;
use serde::Serialize;
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage sports.
  #[command(subcommand)]
  Sport(SportCommand),

  /// Manage members.
  #[command(subcommand)]
  Member(MemberCommand),

  /// Subscribe a member to a sport (reactivates a cancelled subscription).
  Subscribe { member_id: Uuid, sport_id: Uuid },

  /// Cancel a member's subscription to a sport.
  Cancel { member_id: Uuid, sport_id: Uuid },

  /// List subscription rows, optionally for one member or one sport.
  Subscriptions {
    #[arg(long, conflicts_with = "sport")]
    member: Option<Uuid>,
    #[arg(long)]
    sport:  Option<Uuid>,
  },

  /// Write the starter sports if no sports exist yet.
  Seed,

  /// Delete every sport, member and subscription.
  Reset {
    /// Required; guards against accidental wipes.
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum SportCommand {
  Add {
    #[arg(long)]
    name:        String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    category:    String,
    #[arg(long)]
    max_members: Option<NonZeroU32>,
  },
  List {
    #[arg(long)]
    category: Option<String>,
  },
  Show {
    id:      Uuid,
    /// Include the actively subscribed members.
    #[arg(long)]
    members: bool,
  },
  Update {
    id:                Uuid,
    #[arg(long)]
    name:              Option<String>,
    #[arg(long)]
    description:       Option<String>,
    #[arg(long)]
    category:          Option<String>,
    #[arg(long, conflicts_with = "clear_max_members")]
    max_members:       Option<NonZeroU32>,
    #[arg(long)]
    clear_max_members: bool,
  },
  Delete { id: Uuid },
}

#[derive(Args, Debug)]
pub struct MemberFields {
  #[arg(long)]
  pub first_name:      Option<String>,
  #[arg(long)]
  pub last_name:       Option<String>,
  #[arg(long)]
  pub email:           Option<String>,
  #[arg(long)]
  pub phone:           Option<String>,
  /// `YYYY-MM-DD`
  #[arg(long)]
  pub date_of_birth:   Option<NaiveDate>,
  #[arg(long)]
  pub address:         Option<String>,
  /// `YYYY-MM-DD`; defaults to today when adding.
  #[arg(long)]
  pub membership_date: Option<NaiveDate>,
  /// `active` or `inactive`.
  #[arg(long)]
  pub status:          Option<MemberStatus>,
}

impl MemberFields {
  fn into_new_member(self) -> Result<NewMember> {
    fn required<T>(v: Option<T>, flag: &str) -> Result<T> {
      v.ok_or_else(|| anyhow!("--{flag} is required"))
    }

    Ok(NewMember {
      first_name:      required(self.first_name, "first-name")?,
      last_name:       required(self.last_name, "last-name")?,
      email:           required(self.email, "email")?,
      phone:           self.phone.unwrap_or_default(),
      date_of_birth:   required(self.date_of_birth, "date-of-birth")?,
      address:         self.address.unwrap_or_default(),
      membership_date: self
        .membership_date
        .unwrap_or_else(|| Utc::now().date_naive()),
      status:          self.status.unwrap_or_default(),
    })
  }

  fn into_patch(self) -> MemberPatch {
    MemberPatch {
      first_name:      self.first_name,
      last_name:       self.last_name,
      email:           self.email,
      phone:           self.phone,
      date_of_birth:   self.date_of_birth,
      address:         self.address,
      membership_date: self.membership_date,
      status:          self.status,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
  Add(MemberFields),
  List {
    #[arg(long)]
    status: Option<MemberStatus>,
  },
  Show {
    id:     Uuid,
    /// Include the actively subscribed sports.
    #[arg(long)]
    sports: bool,
  },
  Find {
    #[arg(long)]
    email: String,
  },
  Update {
    id:     Uuid,
    #[command(flatten)]
    fields: MemberFields,
  },
  Delete { id: Uuid },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value).context("serialising output")?;
  println!("{out}");
  Ok(())
}

/// Execute `cmd` against `store`, printing the result as JSON on stdout.
pub async fn run(store: &SqliteStore, cmd: Command) -> Result<()> {
  match cmd {
    Command::Sport(cmd) => run_sport(store, cmd).await,
    Command::Member(cmd) => run_member(store, cmd).await,
    Command::Subscribe { member_id, sport_id } => {
      let sub = store
        .subscribe_member_to_sport(member_id, sport_id)
        .await
        .context("subscribe failed")?;
      print_json(&sub)
    }
    Command::Cancel { member_id, sport_id } => {
      let sub = store
        .cancel_subscription(member_id, sport_id)
        .await
        .context("cancel failed")?;
      print_json(&sub)
    }
    Command::Subscriptions { member, sport } => {
      let rows = match (member, sport) {
        (Some(m), _) => store.get_member_subscriptions(m).await,
        (None, Some(s)) => store.get_sport_subscriptions(s).await,
        (None, None) => store.get_all_subscriptions().await,
      }
      .context("listing subscriptions failed")?;
      print_json(&rows)
    }
    Command::Seed => {
      let inserted = store.seed_if_empty().await.context("seeding failed")?;
      print_json(&serde_json::json!({ "inserted": inserted }))
    }
    Command::Reset { yes } => {
      if !yes {
        return Err(anyhow!("refusing to wipe the store without --yes"));
      }
      store.clear_all_data().await.context("reset failed")?;
      tracing::info!("store reset");
      Ok(())
    }
  }
}

async fn run_sport<S: ClubStore>(store: &S, cmd: SportCommand) -> Result<()> {
  match cmd {
    SportCommand::Add { name, description, category, max_members } => {
      let sport = store
        .add_sport(NewSport { name, description, category, max_members })
        .await
        .context("adding sport failed")?;
      print_json(&sport)
    }
    SportCommand::List { category } => {
      let sports = match category {
        Some(c) => store.get_sports_by_category(&c).await,
        None => store.get_all_sports().await,
      }
      .context("listing sports failed")?;
      print_json(&sports)
    }
    SportCommand::Show { id, members: true } => {
      let view = store
        .get_sport_with_members(id)
        .await
        .context("loading sport failed")?
        .ok_or_else(|| anyhow!("sport {id} not found"))?;
      print_json(&view)
    }
    SportCommand::Show { id, members: false } => {
      let sport = store
        .get_sport(id)
        .await
        .context("loading sport failed")?
        .ok_or_else(|| anyhow!("sport {id} not found"))?;
      print_json(&sport)
    }
    SportCommand::Update {
      id,
      name,
      description,
      category,
      max_members,
      clear_max_members,
    } => {
      let max_members = if clear_max_members {
        Some(None)
      } else {
        max_members.map(Some)
      };
      let sport = store
        .update_sport(id, SportPatch { name, description, category, max_members })
        .await
        .context("updating sport failed")?;
      print_json(&sport)
    }
    SportCommand::Delete { id } => {
      let removed = store.delete_sport(id).await.context("deleting sport failed")?;
      print_json(&serde_json::json!({ "sport_id": id, "removed": removed }))
    }
  }
}

async fn run_member<S: ClubStore>(store: &S, cmd: MemberCommand) -> Result<()> {
  match cmd {
    MemberCommand::Add(fields) => {
      let member = store
        .add_member(fields.into_new_member()?)
        .await
        .context("adding member failed")?;
      tracing::info!(
        member_id = %member.member_id,
        name = %member.full_name(),
        "added member"
      );
      print_json(&member)
    }
    MemberCommand::List { status } => {
      let members = match status {
        Some(st) => store.get_members_by_status(st).await,
        None => store.get_all_members().await,
      }
      .context("listing members failed")?;
      print_json(&members)
    }
    MemberCommand::Show { id, sports: true } => {
      let view = store
        .get_member_with_sports(id)
        .await
        .context("loading member failed")?
        .ok_or_else(|| anyhow!("member {id} not found"))?;
      print_json(&view)
    }
    MemberCommand::Show { id, sports: false } => {
      let member = store
        .get_member(id)
        .await
        .context("loading member failed")?
        .ok_or_else(|| anyhow!("member {id} not found"))?;
      print_json(&member)
    }
    MemberCommand::Find { email } => {
      let member = store
        .get_member_by_email(&email)
        .await
        .context("looking up member failed")?
        .ok_or_else(|| anyhow!("no member with email {email:?}"))?;
      print_json(&member)
    }
    MemberCommand::Update { id, fields } => {
      let member = store
        .update_member(id, fields.into_patch())
        .await
        .context("updating member failed")?;
      print_json(&member)
    }
    MemberCommand::Delete { id } => {
      let removed = store
        .delete_member(id)
        .await
        .context("deleting member failed")?;
      print_json(&serde_json::json!({ "member_id": id, "removed": removed }))
    }
  }
}
