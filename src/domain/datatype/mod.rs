pub mod birthdate;
