//! Interactive command loop over a [`ContractTermsController`].

use crate::terminal::TerminalPrompt;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use termdesk_core::client::ContractTermApi;
use termdesk_core::controller::form::{placeholder, NewTermForm, RowEditor, SaveDecision};
use termdesk_core::controller::{ContractTermsController, ControllerError, UpdateOutcome};
use termdesk_core::model::contract_term::{ContractTermId, Field, FieldErrors};
use termdesk_core::model::formula::{formula_legend, unknown_placeholders};

type Controller<A, I, W> = ContractTermsController<A, TerminalPrompt<I, W>>;

/// Note input that empties the note during `edit`.
const CLEAR_NOTE: &str = "-";

const HELP: &str = "\
commands:
  list            show the current view
  search <text>   filter by label (empty text clears)
  sort            sort by label, toggling direction
  add             create a contract term
  edit <id>       edit label, formula and note ('-' clears the note)
  delete <id>     delete a contract term
  legend          show formula placeholders
  reload          fetch the list again
  help            show this help
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Search(String),
    Sort,
    Add,
    Edit(ContractTermId),
    Delete(ContractTermId),
    Legend,
    Reload,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let command = match name {
        "list" | "ls" => Command::List,
        "search" => Command::Search(rest.to_string()),
        "sort" => Command::Sort,
        "add" | "new" => Command::Add,
        "edit" => Command::Edit(parse_id(rest)?),
        "delete" | "rm" => Command::Delete(parse_id(rest)?),
        "legend" => Command::Legend,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<ContractTermId, String> {
    raw.parse::<ContractTermId>()
        .map_err(|_| format!("expected a numeric id, got `{raw}`"))
}

/// Loads the list, then reads commands until `quit` or end of input.
pub fn run<A, I, W>(controller: &mut Controller<A, I, W>) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    if controller.load().is_ok() {
        render(controller)?;
    }

    loop {
        let Some(line) = controller.prompt_mut().read_line("termdesk> ")? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(controller.prompt_mut().out(), "{message}")?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::List => render(controller)?,
            Command::Search(query) => {
                controller.search(&query);
                render(controller)?;
            }
            Command::Sort => {
                let ascending = controller.toggle_sort();
                let direction = if ascending { "ascending" } else { "descending" };
                writeln!(controller.prompt_mut().out(), "sorted by label, {direction}")?;
                render(controller)?;
            }
            Command::Add => add(controller)?,
            Command::Edit(id) => edit(controller, id)?,
            Command::Delete(id) => {
                if controller.delete(id).is_ok() {
                    render(controller)?;
                }
            }
            Command::Legend => legend(controller)?,
            Command::Reload => {
                if controller.load().is_ok() {
                    render(controller)?;
                }
            }
            Command::Help => writeln!(controller.prompt_mut().out(), "{HELP}")?,
        }
        controller.tick(Instant::now());
    }
    Ok(())
}

fn render<A, I, W>(controller: &mut Controller<A, I, W>) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let now = Instant::now();
    let rows: Vec<String> = controller
        .filtered()
        .iter()
        .map(|term| {
            let marker = if controller.is_highlighted(term.id, now) {
                '*'
            } else {
                ' '
            };
            format!(
                "{marker} {:>4}  {:<24}  {:<32}  {}",
                term.id,
                term.label,
                term.formula,
                term.display_note()
            )
        })
        .collect();
    let empty = controller.empty_message();

    let out = controller.prompt_mut().out();
    if let Some(message) = empty {
        return writeln!(out, "{message}");
    }
    writeln!(out, "  {:>4}  {:<24}  {:<32}  note", "id", "label", "formula")?;
    for row in rows {
        writeln!(out, "{row}")?;
    }
    Ok(())
}

fn legend<A, I, W>(controller: &mut Controller<A, I, W>) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let out = controller.prompt_mut().out();
    for entry in formula_legend() {
        writeln!(out, "{{{}}}  {}", entry.placeholder, entry.title)?;
        writeln!(out, "    formula: {}", entry.formula)?;
        writeln!(out, "    example: {}", entry.example)?;
    }
    Ok(())
}

fn add<A, I, W>(controller: &mut Controller<A, I, W>) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let mut form = NewTermForm::new();
    for field in [Field::Label, Field::Formula, Field::Note] {
        let label = format!("{}: ", placeholder(field, false));
        let Some(value) = controller.prompt_mut().read_line(&label)? else {
            return Ok(());
        };
        form.set_field(field, value);
    }

    let Some(fields) = form.submit() else {
        return report_flags(controller, |field| form.has_error(field));
    };
    warn_unknown_placeholders(controller, &fields.formula)?;

    match controller.create(fields.clone()) {
        Ok(_) => render(controller),
        Err(err) => match err.field_errors() {
            Some(errors) => {
                form.restore(fields, errors);
                report_field_errors(controller, errors)
            }
            None => Ok(()),
        },
    }
}

fn edit<A, I, W>(controller: &mut Controller<A, I, W>, id: ContractTermId) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let Some(record) = controller.data().iter().find(|term| term.id == id).cloned() else {
        return writeln!(controller.prompt_mut().out(), "no contract term with id {id}");
    };

    let mut editor = RowEditor::new(&record);
    editor.begin_edit();
    for field in [Field::Label, Field::Formula, Field::Note] {
        let current = match field {
            Field::Label => record.label.as_str(),
            Field::Formula => record.formula.as_str(),
            Field::Note => record.note.as_deref().unwrap_or(""),
        };
        let label = match field {
            Field::Note => format!(
                "{} [{current}] ('{CLEAR_NOTE}' clears): ",
                placeholder(field, false)
            ),
            _ => format!("{} [{current}]: ", placeholder(field, false)),
        };
        let Some(value) = controller.prompt_mut().read_line(&label)? else {
            editor.cancel();
            return Ok(());
        };
        // Empty input keeps the current value.
        if field == Field::Note && value.trim() == CLEAR_NOTE {
            editor.set_field(field, "");
        } else if !value.is_empty() {
            editor.set_field(field, value);
        }
    }

    match editor.save() {
        SaveDecision::Invalid => report_flags(controller, |field| editor.has_error(field)),
        SaveDecision::Unchanged => {
            editor.cancel();
            writeln!(
                controller.prompt_mut().out(),
                "label and formula unchanged; nothing saved"
            )
        }
        SaveDecision::Submit(fields) => {
            warn_unknown_placeholders(controller, &fields.formula)?;
            match controller.update(id, fields) {
                Ok(UpdateOutcome::Saved(saved)) => {
                    editor.sync(&saved);
                    render(controller)
                }
                Ok(UpdateOutcome::Unchanged) => Ok(()),
                Err(err) => on_save_error(controller, &mut editor, &err),
            }
        }
    }
}

fn on_save_error<A, I, W>(
    controller: &mut Controller<A, I, W>,
    editor: &mut RowEditor,
    err: &ControllerError,
) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    match err.field_errors() {
        Some(errors) => {
            editor.apply_server_errors(errors);
            report_field_errors(controller, errors)
        }
        None => Ok(()),
    }
}

fn report_flags<A, I, W>(
    controller: &mut Controller<A, I, W>,
    has_error: impl Fn(Field) -> bool,
) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let out = controller.prompt_mut().out();
    for field in [Field::Label, Field::Formula] {
        if has_error(field) {
            writeln!(out, "{}", placeholder(field, true))?;
        }
    }
    Ok(())
}

fn report_field_errors<A, I, W>(
    controller: &mut Controller<A, I, W>,
    errors: &FieldErrors,
) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let out = controller.prompt_mut().out();
    for (field, messages) in errors.iter() {
        writeln!(out, "{field} {}", messages.join(", "))?;
    }
    Ok(())
}

fn warn_unknown_placeholders<A, I, W>(
    controller: &mut Controller<A, I, W>,
    formula: &str,
) -> io::Result<()>
where
    A: ContractTermApi,
    I: BufRead,
    W: Write,
{
    let unknown = unknown_placeholders(formula);
    if unknown.is_empty() {
        return Ok(());
    }
    writeln!(
        controller.prompt_mut().out(),
        "note: formula uses placeholders missing from the legend: {}",
        unknown.join(", ")
    )
}
