// Crate entry point. Re-export modules so tests and the worker binary can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.

pub mod core {
    pub mod event;
    pub mod ports;
    pub mod user;
}

pub mod application {
    pub mod consumer;
    pub mod handlers;
    pub mod serializer;
    pub mod supervisor;
}

pub mod adapters {
    pub mod in_memory {
        pub mod queue;
        pub mod users;
    }
}

pub mod shell {
    pub mod config;
}
