use crate::application::handle::FlowEvent;
use crate::domain::presentation::{EndReason, PresentationState};
use crate::domain::transition::ScreenId;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    event: &'static str,
    detail: &'a str,
}

/// Writes the flow event log as `event,detail` CSV records.
pub struct EventWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> EventWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_event(&mut self, event: &FlowEvent) -> Result<()> {
        let (name, detail) = match event {
            FlowEvent::PresentationRequested(state) => ("presentation", presentation_label(*state)),
            FlowEvent::ScreenShown(screen) => ("screen", screen_label(*screen)),
            FlowEvent::ConfirmationStarted => ("confirmation", "started"),
            FlowEvent::ConfirmationSucceeded => ("confirmation", "succeeded"),
            FlowEvent::Error(notification) => ("error", notification.message.as_str()),
            FlowEvent::Ended(reason) => ("ended", end_label(*reason)),
        };
        self.writer.serialize(EventRecord {
            event: name,
            detail,
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn presentation_label(state: PresentationState) -> &'static str {
    match state {
        PresentationState::Hidden => "hidden",
        PresentationState::Visible => "visible",
    }
}

fn screen_label(screen: ScreenId) -> &'static str {
    match screen {
        ScreenId::MethodsList => "methods_list",
        ScreenId::AddCard => "add_card",
    }
}

fn end_label(reason: EndReason) -> &'static str {
    match reason {
        EndReason::Dismissed => "dismissed",
        EndReason::TornDown => "torn_down",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::{ErrorKind, ErrorNotification};

    #[test]
    fn test_events_written_with_header() {
        let mut buffer = Vec::new();
        {
            let mut writer = EventWriter::new(&mut buffer);
            writer
                .write_event(&FlowEvent::ScreenShown(ScreenId::AddCard))
                .unwrap();
            writer
                .write_event(&FlowEvent::Error(ErrorNotification {
                    kind: ErrorKind::Confirmation,
                    message: "card_declined".to_string(),
                }))
                .unwrap();
            writer
                .write_event(&FlowEvent::Ended(EndReason::Dismissed))
                .unwrap();
            writer.flush().unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "event,detail\nscreen,add_card\nerror,card_declined\nended,dismissed\n"
        );
    }
}
