// Application layer: wires configuration, adapters and the engine together.

pub mod forwarder;
