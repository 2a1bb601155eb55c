// Application layer - Use cases and collaborator seams
pub mod geo_services;
pub mod trip_service;
