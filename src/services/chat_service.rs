//! Chat command handling: turn inbound chat updates into league operations and render the
//! replies posted back to the chat.
//!
//! Only explicit slash commands are understood. Free text, photos and hashtags are ignored.

use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::{
    dto::chat::{ChatEvent, ChatInfo, ChatReply, ChatUpdate, ChatUser},
    error::ServiceError,
    state::{
        SharedState,
        leaderboard::LeaderboardEntry,
        league::{AwardOutcome, JoinOutcome, RegisterOutcome},
        member::WorkoutCategory,
    },
};

/// Commands the bot answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Join,
    Workout(WorkoutCategory),
    Leaderboard,
}

impl Command {
    /// Parse the leading `/command` of a message, ignoring any `@botname` suffix and arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = token
            .split_once('@')
            .map_or(token, |(name, _bot)| name)
            .to_ascii_lowercase();

        match name.as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "join" => Some(Command::Join),
            "leaderboard" => Some(Command::Leaderboard),
            other => WorkoutCategory::from_command(other).map(Command::Workout),
        }
    }
}

/// Process one chat update and return the text to post back, if any.
pub async fn handle_update(
    state: &SharedState,
    update: ChatUpdate,
    now: OffsetDateTime,
) -> Result<ChatReply, ServiceError> {
    let ChatUpdate { chat, from, event } = update;

    match event {
        ChatEvent::Message { text } => match Command::parse(&text) {
            Some(command) => handle_command(state, &chat, &from, command, now).await,
            None => Ok(ChatReply::none()),
        },
        ChatEvent::BotMembership {
            was_member,
            is_member,
        } => handle_bot_membership(state, &chat, &from, was_member, is_member).await,
        ChatEvent::MemberMembership {
            member,
            was_member,
            is_member,
        } => Ok(greet_member(&from, &member, was_member, is_member)),
    }
}

async fn handle_command(
    state: &SharedState,
    chat: &ChatInfo,
    from: &ChatUser,
    command: Command,
    now: OffsetDateTime,
) -> Result<ChatReply, ServiceError> {
    let name = from.display_name();
    debug!(chat_id = %chat.id, member = %from.id, ?command, "chat command received");

    let reply = match (command, team_name(chat)) {
        (Command::Start, _) => welcome_text(&name),
        (Command::Help, _) => help_text(state.league().cooldown()),
        (_, None) => GROUP_ONLY_TEXT.to_owned(),
        (Command::Join, Some(team)) => join_reply(state, team, from, &name, now).await?,
        (Command::Workout(category), Some(team)) => {
            workout_reply(state, team, from, &name, category, now).await?
        }
        (Command::Leaderboard, Some(team)) => match state.league().leaderboard(team) {
            Some(entries) => leaderboard_text(team, &entries),
            None => GROUP_NOT_REGISTERED_TEXT.to_owned(),
        },
    };

    Ok(ChatReply::text(reply))
}

async fn join_reply(
    state: &SharedState,
    team: &str,
    from: &ChatUser,
    name: &str,
    now: OffsetDateTime,
) -> Result<String, ServiceError> {
    let reply = match state.league().join_group(team, &from.id, name, now).await? {
        JoinOutcome::Joined => format!(
            "{name}, you have successfully registered in the workout challenge! Keep werking!"
        ),
        JoinOutcome::AlreadyMember => {
            format!("{name}, you are already registered in the workout challenge!")
        }
        JoinOutcome::GroupNotRegistered => GROUP_NOT_REGISTERED_TEXT.to_owned(),
    };
    Ok(reply)
}

async fn workout_reply(
    state: &SharedState,
    team: &str,
    from: &ChatUser,
    name: &str,
    category: WorkoutCategory,
    now: OffsetDateTime,
) -> Result<String, ServiceError> {
    let outcome = state
        .league()
        .try_award_points(team, &from.id, category, now)
        .await?;

    let reply = match outcome {
        AwardOutcome::Awarded { total, .. } => format!(
            "{name}, good job on completing a {} workout! Your current points is at: {total}. \
             Keep werking!",
            category.as_str()
        ),
        AwardOutcome::RateLimited { retry_after } => format!(
            "{name}, you can only clock one workout {}. Try again in {}.",
            cooldown_text(state.league().cooldown()),
            minutes_text(retry_after)
        ),
        AwardOutcome::NotAMember => {
            format!("{name}, please use /join to register in the workout challenge first!")
        }
        AwardOutcome::GroupNotRegistered => GROUP_NOT_REGISTERED_TEXT.to_owned(),
    };
    Ok(reply)
}

async fn handle_bot_membership(
    state: &SharedState,
    chat: &ChatInfo,
    from: &ChatUser,
    was_member: bool,
    is_member: bool,
) -> Result<ChatReply, ServiceError> {
    let cause = from.display_name();

    if !chat.kind.is_group() {
        match (was_member, is_member) {
            (false, true) => info!(user = %cause, "user started the bot"),
            (true, false) => info!(user = %cause, "user blocked the bot"),
            _ => {}
        }
        return Ok(ChatReply::none());
    }

    match (was_member, is_member) {
        (false, true) => {
            let Some(team) = team_name(chat) else {
                return Err(ServiceError::InvalidInput(format!(
                    "group chat `{}` has no title",
                    chat.id
                )));
            };
            info!(user = %cause, group = %team, "bot added to group");
            let reply = match state
                .league()
                .register_group(team, chat.id.clone())
                .await?
            {
                RegisterOutcome::Registered => ADDED_TEXT.to_owned(),
                RegisterOutcome::AlreadyRegistered { id } if id == chat.id => format!(
                    "Welcome back! \"{team}\" is still taking part in the workout challenge. \
                     Existing members keep their points; new members can use /join."
                ),
                RegisterOutcome::AlreadyRegistered { .. } => format!(
                    "Another chat already takes part in the workout challenge as \"{team}\". \
                     Rename this group and add me back to register it."
                ),
                RegisterOutcome::IdentifierInUse { name } => format!(
                    "This chat is already registered as the team \"{name}\". \
                     Use /join to take part!"
                ),
            };
            Ok(ChatReply::text(reply))
        }
        (true, false) => {
            info!(user = %cause, group_id = %chat.id, "bot removed from group");
            state.league().unregister_group_id(&chat.id).await?;
            Ok(ChatReply::none())
        }
        _ => Ok(ChatReply::none()),
    }
}

fn greet_member(
    cause: &ChatUser,
    member: &ChatUser,
    was_member: bool,
    is_member: bool,
) -> ChatReply {
    let cause = cause.display_name();
    let member = member.display_name();
    match (was_member, is_member) {
        (false, true) => ChatReply::text(format!(
            "{member} was added by {cause}. Welcome! To register yourself in the workout \
             challenge, please use the command: /join\nFor more information on how to use me, \
             use the command: /help"
        )),
        (true, false) => ChatReply::text(format!(
            "{member} is no longer with us. Thanks a lot, {cause}..."
        )),
        _ => ChatReply::none(),
    }
}

/// Team name for a group chat; `None` for private chats, channels or untitled groups.
fn team_name(chat: &ChatInfo) -> Option<&str> {
    chat.title
        .as_deref()
        .filter(|title| chat.kind.is_group() && !title.trim().is_empty())
}

const GROUP_ONLY_TEXT: &str =
    "Workouts are tracked per team. Add me to your team's group chat and use the commands there!";

const GROUP_NOT_REGISTERED_TEXT: &str = "This group is not registered in the workout \
     challenge yet. Remove me and add me back to the group to register it.";

const ADDED_TEXT: &str = "Hello there! Thanks for adding me in. To register yourself in the \
     workout challenge, please use the command: /join\nFor more information on how to use me, \
     use the command: /help\nThank you and have a nice day!";

fn welcome_text(name: &str) -> String {
    format!(
        "Hello {name}, I am a bot that aims to provide a platform to facilitate your team to track \
         your team workouts!"
    )
}

fn help_text(cooldown: Duration) -> String {
    let mut text = String::from(
        "To join the challenge, use the /join command! Once you have joined, clock a workout with \
         its command.\n\nThere are 3 categories of workout you may clock:\n",
    );
    for (position, category) in WorkoutCategory::ALL.into_iter().enumerate() {
        let points = category.points();
        text.push_str(&format!(
            "{}. {} workout (worth {points} point{}, /{})\n",
            position + 1,
            category.as_str().to_uppercase(),
            if points == 1 { "" } else { "s" },
            category.as_str(),
        ));
    }
    text.push_str(&format!(
        "\nYou can clock one workout {}. To check the current leaderboard, use the \
         /leaderboard command!\n\nGood luck and may the fittest win!",
        cooldown_text(cooldown)
    ));
    text
}

fn leaderboard_text(team: &str, entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return format!(
            "No one from {team} has joined the workout challenge yet. Use /join to be the first!"
        );
    }

    let mut text = format!("Leaderboard for {team}:\n");
    for entry in entries {
        text.push_str(&format!(
            "{}. {} - {} point{}\n",
            entry.rank,
            entry.display_name,
            entry.points,
            if entry.points == 1 { "" } else { "s" }
        ));
    }
    text.truncate(text.trim_end().len());
    text
}

/// How often a member may score, e.g. "per hour" or "every 45 minutes".
fn cooldown_text(cooldown: Duration) -> String {
    let minutes = cooldown.whole_minutes();
    match (minutes / 60, minutes % 60) {
        (1, 0) => "per hour".to_owned(),
        (hours, 0) if hours > 1 => format!("every {hours} hours"),
        _ => format!("every {}", minutes_text(cooldown)),
    }
}

/// Whole minutes, rounded up so "0 minutes" is never shown while still blocked.
fn minutes_text(wait: Duration) -> String {
    let seconds = wait.whole_seconds().max(0);
    let minutes = ((seconds + 59) / 60).max(1);
    if minutes == 1 {
        "1 minute".to_owned()
    } else {
        format!("{minutes} minutes")
    }
}
