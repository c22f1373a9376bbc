use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.lookup_address`(...) for the typed address
    LookupAddress,
    /// Run `service.inspect`(...) for the selected zone and typed date
    Inspect,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let typing = matches!(app.screen, Screen::AddressLookup | Screen::DateEntry);
    if !typing && key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::ZoneSelect => match key.code {
            Up | Char('k') => {
                if app.zone_list_index > 0 {
                    app.zone_list_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.zone_list_index + 1 < app.zones.len() {
                    app.zone_list_index += 1;
                }
            }
            Enter | Char(' ') => {
                app.select_current_zone();
            }
            Char('a') => {
                app.error_message = None;
                app.screen = Screen::AddressLookup;
            }
            _ => {}
        },

        Screen::AddressLookup => match key.code {
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.address_input.push(character);
                }
            }
            Backspace => {
                app.address_input.pop();
            }
            Enter => {
                action = Action::LookupAddress;
            }
            Esc => {
                app.screen = Screen::ZoneSelect;
            }
            _ => {}
        },

        Screen::DateEntry => match key.code {
            Char(character) => {
                if character.is_ascii_digit() || character == '-' {
                    app.date_input.push(character);
                }
            }
            Backspace => {
                app.date_input.pop();
            }
            Enter => {
                action = Action::Inspect;
            }
            Esc => {
                app.screen = Screen::ZoneSelect;
            }
            _ => {}
        },

        Screen::InspectionView => match key.code {
            Left | Esc | Char('b') => {
                app.screen = Screen::DateEntry;
            }
            Right | Char('n') => {
                if app.shift_date_input(true).is_some() {
                    action = Action::Inspect;
                }
            }
            Char('p') => {
                if app.shift_date_input(false).is_some() {
                    action = Action::Inspect;
                }
            }
            _ => {}
        },
    }
    action
}
