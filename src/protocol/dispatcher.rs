use crate::config::DiagnosticsConfig;
use crate::core::buffer::PacketReader;
use crate::error::{ProtocolError, Result};
use crate::protocol::opcode::{Opcode, OpcodeSpace};
use crate::protocol::registry::{Instantiated, OpcodeRegistry, RegistryEntry};
use crate::protocol::request::RequestContext;
use crate::protocol::state::ConnectionState;
use crate::utils::logging::PACKET_TARGET;
use crate::utils::metrics::global_metrics;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one inbound frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Decoded and run to completion.
    Handled { opcode: Opcode, name: &'static str },
    /// No registry entry for the id.
    Unrecognized { opcode: Opcode },
    /// Known id without a request type.
    Unimplemented { opcode: Opcode, name: &'static str },
    /// Known request, wrong session phase.
    IllegalState {
        opcode: Opcode,
        name: &'static str,
        state: ConnectionState,
    },
    /// Header or fields could not be decoded.
    Malformed {
        opcode: Option<Opcode>,
        error: ProtocolError,
    },
    /// The request ran and reported a non-fatal error.
    HandlerFailed {
        opcode: Opcode,
        name: &'static str,
        error: ProtocolError,
    },
}

impl FrameOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, FrameOutcome::Handled { .. })
    }

    /// Frames that count against the client's violation budget.
    ///
    /// Unimplemented ids are sent by well-behaved clients all the time and
    /// handler errors are the server's concern, so neither counts.
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            FrameOutcome::Unrecognized { .. }
                | FrameOutcome::IllegalState { .. }
                | FrameOutcome::Malformed { .. }
        )
    }
}

/// Routes frame bodies to request handlers through an [`OpcodeRegistry`].
///
/// The registry is shared and never mutated, so one dispatcher serves every
/// connection without locking.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<OpcodeRegistry>,
    diagnostics: DiagnosticsConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<OpcodeRegistry>, diagnostics: DiagnosticsConfig) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    pub fn registry(&self) -> &OpcodeRegistry {
        &self.registry
    }

    /// Decode and run one frame body for the session in `ctx`.
    ///
    /// Every per-frame problem comes back as a [`FrameOutcome`]; `Err` is
    /// reserved for errors that end the connection.
    pub fn dispatch(&self, frame: &[u8], ctx: &mut RequestContext<'_>) -> Result<FrameOutcome> {
        let metrics = global_metrics();
        let mut reader = PacketReader::new(frame);

        let opcode = match Opcode::read(&mut reader, self.registry.marker()) {
            Ok(opcode) => opcode,
            Err(error) => {
                metrics.frame_malformed();
                debug!(error = %error, len = frame.len(), "Frame too short for its opcode");
                return Ok(FrameOutcome::Malformed {
                    opcode: None,
                    error,
                });
            }
        };

        let entry = match self.registry.resolve_opcode(opcode) {
            Some(entry) => entry,
            None => {
                metrics.frame_unknown();
                self.trace_unknown(opcode, ctx.session.state(), None);
                return Ok(FrameOutcome::Unrecognized { opcode });
            }
        };

        let mut request = match entry.instantiate() {
            Instantiated::Request(request) => request,
            Instantiated::Unimplemented => {
                metrics.frame_unimplemented();
                self.trace_unknown(opcode, ctx.session.state(), Some(entry.name()));
                return Ok(FrameOutcome::Unimplemented {
                    opcode,
                    name: entry.name(),
                });
            }
        };

        let state = ctx.session.state();
        if !entry.is_legal_in(state) {
            metrics.frame_illegal_state();
            debug!(
                opcode = %opcode,
                name = entry.name(),
                state = %state,
                allowed = ?entry.states(),
                "Request not allowed in current state"
            );
            return Ok(FrameOutcome::IllegalState {
                opcode,
                name: entry.name(),
                state,
            });
        }

        if let Err(error) = request.read(&mut reader) {
            metrics.frame_malformed();
            debug!(opcode = %opcode, name = entry.name(), error = %error, "Malformed request");
            return Ok(FrameOutcome::Malformed {
                opcode: Some(opcode),
                error,
            });
        }

        self.trace_request(entry);

        match request.run(ctx) {
            Ok(()) => {
                metrics.frame_handled();
                Ok(FrameOutcome::Handled {
                    opcode,
                    name: entry.name(),
                })
            }
            Err(error) if error.is_connection_fatal() => Err(error),
            Err(error) => {
                metrics.handler_error();
                warn!(
                    opcode = %opcode,
                    name = entry.name(),
                    error = %error,
                    "Request handler failed"
                );
                Ok(FrameOutcome::HandlerFailed {
                    opcode,
                    name: entry.name(),
                    error,
                })
            }
        }
    }

    fn trace_request(&self, entry: &RegistryEntry) {
        let enabled = match entry.opcode().space() {
            OpcodeSpace::Primary => self.diagnostics.log_client_packets,
            OpcodeSpace::Extended => self.diagnostics.log_ex_client_packets,
        };
        if !enabled || self.diagnostics.is_excluded(entry.name()) {
            return;
        }
        match entry.opcode().space() {
            OpcodeSpace::Primary => info!(target: PACKET_TARGET, "[C] {}", entry.name()),
            OpcodeSpace::Extended => info!(target: PACKET_TARGET, "[C EX] {}", entry.name()),
        }
    }

    fn trace_unknown(&self, opcode: Opcode, state: ConnectionState, name: Option<&'static str>) {
        if !self.diagnostics.log_unknown_packets {
            return;
        }
        let prefix = match opcode.space() {
            OpcodeSpace::Primary => "[C]",
            OpcodeSpace::Extended => "[C EX]",
        };
        match name {
            Some(name) => info!(
                target: PACKET_TARGET,
                "{} {} ({}) unimplemented, state {}", prefix, opcode, name, state
            ),
            None => info!(
                target: PACKET_TARGET,
                "{} unknown opcode {}, state {}", prefix, opcode, state
            ),
        }
    }
}
