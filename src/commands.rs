/// Dashboard commands, parsing and autocomplete logic

/// Identity of a dashboard command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
  List,
  Refresh,
  Add,
  Edit,
  Set,
  Tech,
  Show,
  Save,
  Cancel,
  Delete,
  Filter,
  All,
  Theme,
  Logout,
  Quit,
  Help,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub id: CommandId,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    id: CommandId::List,
    name: "list",
    aliases: &["ls", "l"],
    usage: "list",
    description: "Show the project list",
  },
  Command {
    id: CommandId::Refresh,
    name: "refresh",
    aliases: &["r", "reload"],
    usage: "refresh",
    description: "Fetch the project list from the server",
  },
  Command {
    id: CommandId::Add,
    name: "add",
    aliases: &["a", "new"],
    usage: "add",
    description: "Open a form for a new project",
  },
  Command {
    id: CommandId::Edit,
    name: "edit",
    aliases: &["e"],
    usage: "edit <id>",
    description: "Open a form on an existing project",
  },
  Command {
    id: CommandId::Set,
    name: "set",
    aliases: &[],
    usage: "set <field> <value>",
    description: "Set a form field (title, description, image, category, featured, github, live)",
  },
  Command {
    id: CommandId::Tech,
    name: "tech",
    aliases: &["t"],
    usage: "tech add|rm <name|n>",
    description: "Add or remove a technology tag",
  },
  Command {
    id: CommandId::Show,
    name: "show",
    aliases: &["form"],
    usage: "show",
    description: "Show the open form",
  },
  Command {
    id: CommandId::Save,
    name: "save",
    aliases: &["s", "submit"],
    usage: "save",
    description: "Submit the open form",
  },
  Command {
    id: CommandId::Cancel,
    name: "cancel",
    aliases: &["c"],
    usage: "cancel",
    description: "Close the open form without saving",
  },
  Command {
    id: CommandId::Delete,
    name: "delete",
    aliases: &["d", "rm"],
    usage: "delete <id>",
    description: "Delete a project (asks for confirmation)",
  },
  Command {
    id: CommandId::Filter,
    name: "filter",
    aliases: &["f", "category"],
    usage: "filter <category|all>",
    description: "Only list projects in one category",
  },
  Command {
    id: CommandId::All,
    name: "all",
    aliases: &["featured"],
    usage: "all",
    description: "Toggle between featured and all projects",
  },
  Command {
    id: CommandId::Theme,
    name: "theme",
    aliases: &["dark"],
    usage: "theme [on|off]",
    description: "Toggle or set dark mode",
  },
  Command {
    id: CommandId::Logout,
    name: "logout",
    aliases: &[],
    usage: "logout",
    description: "Log out and leave the dashboard",
  },
  Command {
    id: CommandId::Quit,
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Leave the dashboard",
  },
  Command {
    id: CommandId::Help,
    name: "help",
    aliases: &["h", "?"],
    usage: "help",
    description: "Show this list",
  },
];

/// A parsed dashboard command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  List,
  Refresh,
  Add,
  Edit(u64),
  Set { field: String, value: String },
  TechAdd(String),
  TechRemove(usize),
  Show,
  Save,
  Cancel,
  Delete(u64),
  Filter(String),
  ToggleAll,
  /// `None` toggles
  Theme(Option<bool>),
  Logout,
  Quit,
  Help,
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve a command word by exact name or alias.
fn resolve(word: &str) -> Result<&'static Command, String> {
  let word_lower = word.to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == word_lower || cmd.aliases.contains(&word_lower.as_str()))
    .ok_or_else(|| match get_suggestions(word).first() {
      Some(cmd) => format!("Unknown command '{}'. Did you mean '{}'?", word, cmd.name),
      None => format!("Unknown command '{}'. Type 'help' for a list.", word),
    })
}

fn parse_id(arg: Option<&str>, usage: &str) -> Result<u64, String> {
  arg
    .and_then(|a| a.trim().parse().ok())
    .ok_or_else(|| format!("Usage: {}", usage))
}

/// Parse one line of input into an action
pub fn parse(line: &str) -> Result<Action, String> {
  let line = line.trim();
  let (word, rest) = match line.split_once(char::is_whitespace) {
    Some((word, rest)) => (word, Some(rest.trim())),
    None => (line, None),
  };

  match resolve(word)?.id {
    CommandId::List => Ok(Action::List),
    CommandId::Refresh => Ok(Action::Refresh),
    CommandId::Add => Ok(Action::Add),
    CommandId::Edit => parse_id(rest, "edit <id>").map(Action::Edit),
    CommandId::Set => {
      let usage = || "Usage: set <field> <value>".to_string();
      let rest = rest.ok_or_else(usage)?;
      let (field, value) = match rest.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (rest, ""),
      };
      Ok(Action::Set {
        field: field.to_string(),
        value: value.to_string(),
      })
    }
    CommandId::Tech => {
      let usage = || "Usage: tech add <name> | tech rm <n>".to_string();
      let (sub, arg) = rest
        .and_then(|r| r.split_once(char::is_whitespace))
        .ok_or_else(usage)?;
      match sub {
        "add" => Ok(Action::TechAdd(arg.trim().to_string())),
        "rm" | "remove" => arg
          .trim()
          .parse()
          .map(Action::TechRemove)
          .map_err(|_| usage()),
        _ => Err(usage()),
      }
    }
    CommandId::Show => Ok(Action::Show),
    CommandId::Save => Ok(Action::Save),
    CommandId::Cancel => Ok(Action::Cancel),
    CommandId::Delete => parse_id(rest, "delete <id>").map(Action::Delete),
    CommandId::Filter => rest
      .filter(|r| !r.is_empty())
      .map(|r| Action::Filter(r.to_string()))
      .ok_or_else(|| "Usage: filter <category|all>".to_string()),
    CommandId::All => Ok(Action::ToggleAll),
    CommandId::Theme => match rest.map(str::to_lowercase).as_deref() {
      None | Some("") => Ok(Action::Theme(None)),
      Some("on" | "dark") => Ok(Action::Theme(Some(true))),
      Some("off" | "light") => Ok(Action::Theme(Some(false))),
      Some(_) => Err("Usage: theme [on|off]".to_string()),
    },
    CommandId::Logout => Ok(Action::Logout),
    CommandId::Quit => Ok(Action::Quit),
    CommandId::Help => Ok(Action::Help),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("delete");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "delete");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("rm");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "delete");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("ref");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("fres");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_parse_simple_commands() {
    assert_eq!(parse("list"), Ok(Action::List));
    assert_eq!(parse("  R  "), Ok(Action::Refresh));
    assert_eq!(parse("q"), Ok(Action::Quit));
    assert_eq!(parse("?"), Ok(Action::Help));
  }

  #[test]
  fn test_parse_ids() {
    assert_eq!(parse("edit 4"), Ok(Action::Edit(4)));
    assert_eq!(parse("d 12"), Ok(Action::Delete(12)));
    assert_eq!(parse("delete"), Err("Usage: delete <id>".to_string()));
    assert_eq!(parse("edit four"), Err("Usage: edit <id>".to_string()));
  }

  #[test]
  fn test_parse_set_keeps_spaces_in_value() {
    assert_eq!(
      parse("set title  My Shop Front "),
      Ok(Action::Set {
        field: "title".to_string(),
        value: "My Shop Front".to_string(),
      })
    );
    assert_eq!(
      parse("set github"),
      Ok(Action::Set {
        field: "github".to_string(),
        value: String::new(),
      })
    );
  }

  #[test]
  fn test_parse_tech() {
    assert_eq!(parse("tech add Node.js"), Ok(Action::TechAdd("Node.js".to_string())));
    assert_eq!(parse("tech rm 1"), Ok(Action::TechRemove(1)));
    assert!(parse("tech rm x").is_err());
    assert!(parse("tech").is_err());
  }

  #[test]
  fn test_parse_filter() {
    assert_eq!(parse("filter Mobile App"), Ok(Action::Filter("Mobile App".to_string())));
    assert_eq!(parse("f all"), Ok(Action::Filter("all".to_string())));
    assert!(parse("filter").is_err());
    assert_eq!(parse("all"), Ok(Action::ToggleAll));
  }

  #[test]
  fn test_parse_theme() {
    assert_eq!(parse("theme"), Ok(Action::Theme(None)));
    assert_eq!(parse("theme on"), Ok(Action::Theme(Some(true))));
    assert_eq!(parse("dark OFF"), Ok(Action::Theme(Some(false))));
    assert!(parse("theme purple").is_err());
  }

  #[test]
  fn test_every_command_parses_to_its_own_action() {
    for cmd in COMMANDS {
      let line = match cmd.id {
        CommandId::Edit | CommandId::Delete => format!("{} 1", cmd.name),
        CommandId::Set => format!("{} title X", cmd.name),
        CommandId::Tech => format!("{} add Rust", cmd.name),
        CommandId::Filter => format!("{} Web App", cmd.name),
        _ => cmd.name.to_string(),
      };
      let action = parse(&line).unwrap();
      assert_eq!(
        action == Action::Help,
        cmd.id == CommandId::Help,
        "{} parsed to {:?}",
        cmd.name,
        action
      );
    }
  }

  #[test]
  fn test_unknown_command_suggests() {
    let err = parse("refr").unwrap_err();
    assert_eq!(err, "Unknown command 'refr'. Did you mean 'refresh'?");
    let err = parse("zzz").unwrap_err();
    assert!(err.contains("Type 'help'"));
  }
}
