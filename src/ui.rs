// UI layer: the clap command tree plus one handler per subcommand. Handlers
// call into the services and print either a short human-readable summary
// or the raw JSON objects when `-j` is given.

use crate::api::SparkClient;
use crate::config::Config;
use crate::login::Login;
use crate::services::{
    Membership, MembershipService, MessageService, PeopleService, Person, RoomRef, RoomService,
};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use reqwest::blocking::Client;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "sparkcli", version, about = "Command Line Interface for Cisco Spark")]
pub struct Cli {
    /// Return results as JSON
    #[arg(short = 'j', long = "json", global = true)]
    pub json: bool,

    /// Config file to use instead of searching ./, /etc/sparkcli and ~
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Login to Cisco Spark
    #[command(visible_alias = "l")]
    Login {
        /// Prompt for the authorization code when none is configured
        #[arg(short, long)]
        interactive: bool,
    },
    /// Operations on rooms
    #[command(visible_alias = "r", subcommand)]
    Rooms(RoomsCommand),
    /// Operations on messages
    #[command(visible_alias = "m", subcommand)]
    Messages(MessagesCommand),
    /// Operations on people
    #[command(visible_alias = "p", subcommand)]
    People(PeopleCommand),
    /// Operations on memberships
    #[command(visible_alias = "ms", subcommand)]
    Memberships(MembershipsCommand),
}

#[derive(Subcommand, Debug)]
pub enum RoomsCommand {
    /// List all rooms
    #[command(visible_alias = "l")]
    List,
    /// Create a new room
    #[command(visible_alias = "c")]
    Create { title: String },
    /// Get room details
    #[command(visible_alias = "g")]
    Get {
        /// Room id, or `-` for the default room
        #[arg(default_value = "-")]
        room: RoomRef,
    },
    /// Delete a room
    #[command(visible_alias = "d")]
    Delete { id: String },
    /// Show or save the default room
    Default { id: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
    /// List messages in a room
    #[command(visible_alias = "l")]
    List {
        /// Room id, or `-` for the default room
        #[arg(default_value = "-")]
        room: RoomRef,
    },
    /// Create a new message
    #[command(visible_alias = "c", subcommand)]
    Create(CreateMessage),
    /// Get message details
    #[command(visible_alias = "g")]
    Get { id: String },
    /// Delete a message
    #[command(visible_alias = "d")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CreateMessage {
    /// Create a new text message
    Text {
        /// Room id, `-` for the default room or `email:<address>`
        room: RoomRef,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Send an attachment
    File {
        /// Room id, `-` for the default room or `email:<address>`
        room: RoomRef,
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum PeopleCommand {
    /// Get a person's details (yours by default)
    #[command(visible_alias = "g")]
    Get {
        #[arg(default_value = "me")]
        id: String,
    },
    /// List people
    #[command(visible_alias = "l")]
    List {
        /// Email to search for
        #[arg(short, long, default_value = "")]
        email: String,
        /// Name to search for (starts with)
        #[arg(short, long, default_value = "")]
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct PersonFilter {
    /// Person id
    #[arg(short = 'p', long = "personid", default_value = "")]
    pub person_id: String,
    /// Person email
    #[arg(short = 'e', long = "email", default_value = "")]
    pub email: String,
}

#[derive(Subcommand, Debug)]
pub enum MembershipsCommand {
    /// List memberships
    #[command(visible_alias = "l")]
    List {
        /// Filter by room id (`-` for the default room)
        #[arg(short, long)]
        room: Option<RoomRef>,
        #[command(flatten)]
        person: PersonFilter,
    },
    /// Add a person to a room
    #[command(visible_alias = "c")]
    Create {
        /// Room to add the person to (`-` for the default room)
        #[arg(short, long)]
        room: RoomRef,
        #[command(flatten)]
        person: PersonFilter,
    },
    /// Get membership details
    #[command(visible_alias = "g")]
    Get { id: String },
    /// Update a membership
    #[command(visible_alias = "u")]
    Update {
        /// Set the moderator role for the membership
        #[arg(short, long)]
        moderator: bool,
        id: String,
    },
    /// Delete a membership
    #[command(visible_alias = "d")]
    Delete { id: String },
}

/// Owns the loaded config and the HTTP transport for one invocation.
pub struct Shell {
    config: Config,
    http: Client,
    json: bool,
}

impl Shell {
    pub fn new(config: Config, http: Client, json: bool) -> Self {
        Shell { config, http, json }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn client(&self) -> SparkClient<'_> {
        SparkClient::new(self.http.clone(), &self.config)
    }

    pub fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { interactive } => self.login(interactive),
            Command::Rooms(cmd) => self.rooms(cmd),
            Command::Messages(cmd) => self.messages(cmd),
            Command::People(cmd) => self.people(cmd),
            Command::Memberships(cmd) => self.memberships(cmd),
        }
    }

    fn login(&mut self, interactive: bool) -> Result<()> {
        info!("Logging in");
        if interactive
            && self.config.auth_code.is_empty()
            && self.config.has_client_credentials()
            && std::io::stdin().is_terminal()
        {
            self.config.print_auth_url();
            let code: String = Input::new()
                .with_prompt("Authorization code")
                .interact_text()?;
            self.config.auth_code = code.trim().to_string();
        }

        let spinner = spinner("Logging in...")?;
        let result = Login::new(&mut self.config, self.http.clone()).authorize();
        spinner.finish_and_clear();
        result?;
        if !self.json {
            println!("Logged in.");
        }
        Ok(())
    }

    /// Run `f` against a room service bound to the loaded config.
    fn with_rooms<T>(&self, f: impl FnOnce(&RoomService) -> crate::Result<T>) -> crate::Result<T> {
        let client = self.client();
        f(&RoomService::new(&client))
    }

    fn rooms(&mut self, cmd: RoomsCommand) -> Result<()> {
        match cmd {
            RoomsCommand::List => {
                let list = self.with_rooms(|rooms| rooms.list())?;
                if self.json {
                    return print_json(&list);
                }
                println!("{:<78}Title", "Id");
                for room in &list {
                    println!("{}: {}", room.id, room.title);
                }
            }
            RoomsCommand::Create { title } => {
                let room = self.with_rooms(|rooms| rooms.create(&title))?;
                if self.json {
                    return print_json(&room);
                }
                // Only the id, so it can be captured in a shell variable.
                println!("{}", room.id);
            }
            RoomsCommand::Get { room } => {
                let room = self.with_rooms(|rooms| rooms.get(&room))?;
                if self.json {
                    return print_json(&room);
                }
                println!("Id:          {}", room.id);
                println!("Title:       {}", room.title);
                println!("Sip Address: {}", room.sip_address);
                println!("Created:     {}", room.created);
            }
            RoomsCommand::Delete { id } => {
                self.with_rooms(|rooms| rooms.delete(&id))?;
                if !self.json {
                    println!("Room deleted.");
                }
            }
            RoomsCommand::Default { id } => return self.default_room(id),
        }
        Ok(())
    }

    fn default_room(&mut self, id: Option<String>) -> Result<()> {
        match id {
            Some(id) => {
                if id.is_empty() || id == "-" {
                    anyhow::bail!("Usage: sparkcli rooms default (<id>)");
                }
                self.config.set_default_room(&id);
                self.config.save()?;
                info!("Default room saved to {}", self.config.path().display());
            }
            None => {
                let id = self.config.default_room().unwrap_or_default();
                if self.json {
                    return print_json(&serde_json::json!({ "defaultRoomId": id }));
                }
                if !id.is_empty() {
                    println!("{}", id);
                }
            }
        }
        Ok(())
    }

    fn messages(&self, cmd: MessagesCommand) -> Result<()> {
        let client = self.client();
        let messages = MessageService::new(&client);
        match cmd {
            MessagesCommand::List { room } => {
                let list = messages.list(&room)?;
                if self.json {
                    return print_json(&list);
                }
                for msg in &list {
                    println!("[{}] {}: {}", msg.created, msg.person_email, msg.text);
                }
            }
            MessagesCommand::Create(CreateMessage::Text { room, text }) => {
                let msg = messages.create(&room, &text.join(" "))?;
                if self.json {
                    return print_json(&msg);
                }
                println!("{}", msg.id);
            }
            MessagesCommand::Create(CreateMessage::File { room, path }) => {
                let spinner = spinner("Uploading...")?;
                let result = messages.create_file(&room, &path);
                spinner.finish_and_clear();
                let msg = result?;
                if self.json {
                    return print_json(&msg);
                }
                println!("{}", msg.id);
            }
            MessagesCommand::Get { id } => {
                let msg = messages.get(&id)?;
                if self.json {
                    return print_json(&msg);
                }
                println!("Id:            {}", msg.id);
                println!("PersonId:      {}", msg.person_id);
                println!("PersonEmail:   {}", msg.person_email);
                println!("RoomId:        {}", msg.room_id);
                println!("Text:          {}", msg.text);
                println!("Files:         {}", msg.files.join(", "));
                println!("ToPersonId:    {}", msg.to_person_id);
                println!("ToPersonEmail: {}", msg.to_person_email);
                println!("Created:       {}", msg.created);
            }
            MessagesCommand::Delete { id } => {
                messages.delete(&id)?;
                if !self.json {
                    println!("Message deleted.");
                }
            }
        }
        Ok(())
    }

    fn people(&self, cmd: PeopleCommand) -> Result<()> {
        let client = self.client();
        let people = PeopleService::new(&client);
        match cmd {
            PeopleCommand::Get { id } => {
                let person = people.get(&id)?;
                if self.json {
                    return print_json(&person);
                }
                println!("Id:      {}", person.id);
                println!("Name:    {}", person.display_name);
                for email in &person.emails {
                    println!("Email:   {}", email);
                }
                println!("Avatar:  {}", person.avatar);
                println!("Created: {}", person.created);
            }
            PeopleCommand::List { email, name } => {
                let list = people.list(&email, &name)?;
                if self.json {
                    return print_json(&list);
                }
                for person in &list {
                    print_person_entry(person);
                }
            }
        }
        Ok(())
    }

    fn memberships(&self, cmd: MembershipsCommand) -> Result<()> {
        let client = self.client();
        let memberships = MembershipService::new(&client);
        match cmd {
            MembershipsCommand::List { room, person } => {
                let list = memberships.list(room.as_ref(), &person.person_id, &person.email)?;
                if self.json {
                    return print_json(&list);
                }
                for ms in &list {
                    println!("{}:", ms.id);
                    println!("   Name: {}", ms.person_display_name);
                    println!("   Email: {}", ms.person_email);
                    println!("   Room: {}", ms.room_id);
                    println!("   Created: {}", ms.created);
                }
            }
            MembershipsCommand::Create { room, person } => {
                let ms = memberships.create(&room, &person.person_id, &person.email)?;
                self.print_membership(&ms)?;
            }
            MembershipsCommand::Get { id } => {
                let ms = memberships.get(&id)?;
                self.print_membership(&ms)?;
            }
            MembershipsCommand::Update { moderator, id } => {
                let ms = memberships.update(&id, moderator)?;
                self.print_membership(&ms)?;
            }
            MembershipsCommand::Delete { id } => {
                memberships.delete(&id)?;
                if !self.json {
                    println!("Membership deleted.");
                }
            }
        }
        Ok(())
    }

    fn print_membership(&self, ms: &Membership) -> Result<()> {
        if self.json {
            return print_json(ms);
        }
        println!("Id:        {}", ms.id);
        println!("Name:      {}", ms.person_display_name);
        println!("Email:     {}", ms.person_email);
        println!("Room:      {}", ms.room_id);
        println!("Moderator: {}", ms.is_moderator);
        println!("Created:   {}", ms.created);
        Ok(())
    }
}

fn print_person_entry(person: &Person) {
    println!("{}:", person.id);
    println!("   Name:    {}", person.display_name);
    println!("   Email:   {}", person.emails.join(", "));
    println!("   Avatar:  {}", person.avatar);
    println!("   Created: {}", person.created);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Spinner on stderr while a slow call runs; it stays hidden when stderr
/// is not a terminal.
fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn json_output_is_opt_in() {
        assert!(!parse(&["sparkcli", "rooms", "list"]).json);
        assert!(parse(&["sparkcli", "-j", "rooms", "list"]).json);
        assert!(parse(&["sparkcli", "rooms", "list", "--json"]).json);
    }

    #[test]
    fn omitted_room_means_default() {
        match parse(&["sparkcli", "m", "l"]).command {
            Command::Messages(MessagesCommand::List { room }) => assert_eq!(room, RoomRef::Default),
            other => panic!("unexpected command {:?}", other),
        }
        match parse(&["sparkcli", "rooms", "get"]).command {
            Command::Rooms(RoomsCommand::Get { room }) => assert_eq!(room, RoomRef::Default),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn text_message_collects_words() {
        let cli = parse(&[
            "sparkcli",
            "messages",
            "create",
            "text",
            "email:bob@example.com",
            "hello",
            "world",
        ]);
        match cli.command {
            Command::Messages(MessagesCommand::Create(CreateMessage::Text { room, text })) => {
                assert_eq!(room, RoomRef::Email("bob@example.com".into()));
                assert_eq!(text.join(" "), "hello world");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn membership_flags() {
        let cli = parse(&["sparkcli", "ms", "create", "-r", "-", "-e", "a@b.c"]);
        match cli.command {
            Command::Memberships(MembershipsCommand::Create { room, person }) => {
                assert_eq!(room, RoomRef::Default);
                assert_eq!(person.email, "a@b.c");
                assert!(person.person_id.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
        let cli = parse(&["sparkcli", "ms", "u", "-m", "MID"]);
        assert!(matches!(
            cli.command,
            Command::Memberships(MembershipsCommand::Update { moderator: true, .. })
        ));
    }

    #[test]
    fn config_flag_overrides_search() {
        let cli = parse(&["sparkcli", "-c", "/tmp/x.toml", "login"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.command, Command::Login { interactive: false }));
    }
}
