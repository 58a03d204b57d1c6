mod intercom;

pub use intercom::IntercomClient;
