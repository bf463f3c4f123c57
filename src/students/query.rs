//! Named student queries
//!
//! Each repository query is a single predicate, a single ordering, or a
//! single aggregate. Predicates never compose.

use std::cmp::Ordering;

use super::model::Student;

/// Single-predicate filter over student rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    /// `last_name == value`
    LastName(String),
    /// First name equal, ignoring case
    FirstNameIgnoreCase(String),
    /// First name starts with the prefix (case-sensitive)
    FirstNameStartsWith(String),
    /// `age > n`
    AgeGreaterThan(i32),
    /// `age < n`
    AgeLessThan(i32),
    /// `min <= age <= max`
    AgeBetween { min: i32, max: i32 },
    /// Email ends with the suffix
    EmailEndsWith(String),
    /// First or last name contains the term, ignoring case
    NameContains(String),
}

impl StudentFilter {
    /// Checks if a student matches this predicate
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            StudentFilter::LastName(last_name) => student.last_name == *last_name,
            StudentFilter::FirstNameIgnoreCase(first_name) => {
                student.first_name.to_lowercase() == first_name.to_lowercase()
            }
            StudentFilter::FirstNameStartsWith(prefix) => student.first_name.starts_with(prefix),
            StudentFilter::AgeGreaterThan(age) => student.age > *age,
            StudentFilter::AgeLessThan(age) => student.age < *age,
            StudentFilter::AgeBetween { min, max } => *min <= student.age && student.age <= *max,
            StudentFilter::EmailEndsWith(suffix) => student.email.ends_with(suffix.as_str()),
            StudentFilter::NameContains(term) => {
                let term = term.to_lowercase();
                student.first_name.to_lowercase().contains(&term)
                    || student.last_name.to_lowercase().contains(&term)
            }
        }
    }
}

/// Whole-table orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentOrder {
    LastNameAsc,
    AgeDesc,
}

impl StudentOrder {
    /// Sorts students in place.
    ///
    /// Stable: equal keys keep their incoming (ascending id) order.
    pub fn sort(&self, students: &mut [Student]) {
        students.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        match self {
            StudentOrder::LastNameAsc => a.last_name.cmp(&b.last_name),
            StudentOrder::AgeDesc => b.age.cmp(&a.age),
        }
    }
}

/// Extremal record by age. Ties go to the lowest id.
pub fn extreme_by_age<'a>(
    students: impl Iterator<Item = &'a Student>,
    oldest: bool,
) -> Option<&'a Student> {
    students.fold(None, |best: Option<&Student>, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            let better = if oldest {
                candidate.age > current.age
            } else {
                candidate.age < current.age
            };
            if better {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

/// Mean age, absent when there are no students
pub fn average_age<'a>(students: impl Iterator<Item = &'a Student>) -> Option<f64> {
    let (count, total) = students.fold((0u64, 0i64), |(count, total), student| {
        (count + 1, total + i64::from(student.age))
    });

    if count == 0 {
        None
    } else {
        Some(total as f64 / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::NewStudent;

    fn student(id: u64, first: &str, last: &str, email: &str, age: i32) -> Student {
        Student::from_candidate(id, NewStudent::new(first, last, email, age))
    }

    fn sample() -> Vec<Student> {
        vec![
            student(1, "Ana", "Lee", "ana@x.com", 20),
            student(2, "Bo", "Kim", "bo@uni.edu", 25),
            student(3, "Cy", "Lee", "cy@x.com", 25),
            student(4, "anabel", "Moss", "anabel@uni.edu", 18),
        ]
    }

    fn ids(filter: &StudentFilter) -> Vec<u64> {
        sample()
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.id)
            .collect()
    }

    #[test]
    fn test_exact_and_case_insensitive_names() {
        assert_eq!(ids(&StudentFilter::LastName("Lee".into())), vec![1, 3]);
        assert!(ids(&StudentFilter::LastName("lee".into())).is_empty());
        assert_eq!(ids(&StudentFilter::FirstNameIgnoreCase("ANA".into())), vec![1]);
        assert_eq!(ids(&StudentFilter::FirstNameStartsWith("An".into())), vec![1]);
    }

    #[test]
    fn test_age_predicates() {
        assert_eq!(ids(&StudentFilter::AgeGreaterThan(20)), vec![2, 3]);
        assert_eq!(ids(&StudentFilter::AgeLessThan(20)), vec![4]);
        assert_eq!(ids(&StudentFilter::AgeBetween { min: 20, max: 25 }), vec![1, 2, 3]);
        assert!(ids(&StudentFilter::AgeBetween { min: 26, max: 20 }).is_empty());
    }

    #[test]
    fn test_between_matches_inclusive_range_for_all_bounds() {
        let students = sample();
        for min in 15..30 {
            for max in min..30 {
                let filter = StudentFilter::AgeBetween { min, max };
                for s in &students {
                    assert_eq!(filter.matches(s), min <= s.age && s.age <= max);
                }
            }
        }
    }

    #[test]
    fn test_email_suffix_and_name_search() {
        assert_eq!(ids(&StudentFilter::EmailEndsWith("@uni.edu".into())), vec![2, 4]);
        assert_eq!(ids(&StudentFilter::NameContains("ANA".into())), vec![1, 4]);
        assert_eq!(ids(&StudentFilter::NameContains("ee".into())), vec![1, 3]);
    }

    #[test]
    fn test_orderings_are_stable() {
        let mut students = sample();
        StudentOrder::LastNameAsc.sort(&mut students);
        let by_name: Vec<u64> = students.iter().map(|s| s.id).collect();
        assert_eq!(by_name, vec![2, 1, 3, 4]);

        let mut students = sample();
        StudentOrder::AgeDesc.sort(&mut students);
        let by_age: Vec<u64> = students.iter().map(|s| s.id).collect();
        assert_eq!(by_age, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_aggregates() {
        let students = sample();
        assert_eq!(extreme_by_age(students.iter(), true).unwrap().id, 2);
        assert_eq!(extreme_by_age(students.iter(), false).unwrap().id, 4);
        assert_eq!(average_age(students.iter()), Some(22.0));

        let empty: Vec<Student> = Vec::new();
        assert!(extreme_by_age(empty.iter(), true).is_none());
        assert!(average_age(empty.iter()).is_none());
    }
}
