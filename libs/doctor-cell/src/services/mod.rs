pub mod availability;
pub mod doctor;
pub mod timeslot;

pub use availability::AvailabilityService;
pub use doctor::DoctorService;
pub use timeslot::TimeSlotService;
