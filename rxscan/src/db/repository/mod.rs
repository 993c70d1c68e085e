mod prescriptions;

pub use prescriptions::PrescriptionRepository;
